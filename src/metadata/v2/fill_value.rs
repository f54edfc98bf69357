use serde::{ser::SerializeSeq, Deserialize, Serialize};

/// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
///
/// JSON has no representation of non-finite numbers, so they are encoded as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
/// Complex fill values are a two element array of their real and imaginary components.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// A boolean.
    Bool(bool),
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
    /// A complex number, `[real, imaginary]`.
    ///
    /// Each component is [`NaN`](Self::NaN), [`Infinity`](Self::Infinity), [`NegInfinity`](Self::NegInfinity) or a [`Number`](Self::Number).
    Complex(Box<[FillValueMetadataV2; 2]>),
}

impl FillValueMetadataV2 {
    /// Create fill value metadata from a floating point number.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::NaN
        } else if value == f64::INFINITY {
            Self::Infinity
        } else if value == f64::NEG_INFINITY {
            Self::NegInfinity
        } else {
            serde_json::Number::from_f64(value).map_or(Self::NaN, Self::Number)
        }
    }

    fn is_float_component(&self) -> bool {
        matches!(
            self,
            Self::NaN | Self::Infinity | Self::NegInfinity | Self::Number(_)
        )
    }
}

impl TryFrom<serde_json::Value> for FillValueMetadataV2 {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(value) => Ok(Self::Bool(value)),
            serde_json::Value::Number(number) => Ok(Self::Number(number)),
            serde_json::Value::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Err(format!("unsupported fill value {string:?}")),
            },
            serde_json::Value::Array(components) => {
                let [re, im]: [serde_json::Value; 2] = components
                    .try_into()
                    .map_err(|_| "complex fill value must have two components".to_string())?;
                let re = Self::try_from(re)?;
                let im = Self::try_from(im)?;
                if re.is_float_component() && im.is_float_component() {
                    Ok(Self::Complex(Box::new([re, im])))
                } else {
                    Err("complex fill value components must be numbers".to_string())
                }
            }
            serde_json::Value::Object(_) => Err("unsupported fill value object".to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
            Self::Complex(components) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&components[0])?;
                seq.serialize_element(&components[1])?;
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value_metadata_v2_non_finite() {
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::from_f64(f64::NAN)).unwrap(),
            r#""NaN""#
        );
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::from_f64(f64::INFINITY)).unwrap(),
            r#""Infinity""#
        );
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::from_f64(f64::NEG_INFINITY)).unwrap(),
            r#""-Infinity""#
        );
        assert_eq!(
            serde_json::from_str::<FillValueMetadataV2>(r#""-Infinity""#).unwrap(),
            FillValueMetadataV2::NegInfinity
        );
    }

    #[test]
    fn fill_value_metadata_v2_number() {
        let fill_value: FillValueMetadataV2 = serde_json::from_str("-1.5").unwrap();
        assert_eq!(fill_value, FillValueMetadataV2::from_f64(-1.5));
        assert_eq!(serde_json::to_string(&fill_value).unwrap(), "-1.5");
        let fill_value: FillValueMetadataV2 =
            serde_json::from_str("-9223372036854775808").unwrap();
        assert_eq!(
            serde_json::to_string(&fill_value).unwrap(),
            "-9223372036854775808"
        );
    }

    #[test]
    fn fill_value_metadata_v2_null_bool() {
        assert_eq!(
            serde_json::from_str::<FillValueMetadataV2>("null").unwrap(),
            FillValueMetadataV2::Null
        );
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::Bool(true)).unwrap(),
            "true"
        );
    }

    #[test]
    fn fill_value_metadata_v2_complex() {
        let fill_value: FillValueMetadataV2 = serde_json::from_str(r#"[1.0, "NaN"]"#).unwrap();
        assert_eq!(
            fill_value,
            FillValueMetadataV2::Complex(Box::new([
                FillValueMetadataV2::from_f64(1.0),
                FillValueMetadataV2::NaN
            ]))
        );
        assert_eq!(serde_json::to_string(&fill_value).unwrap(), r#"[1.0,"NaN"]"#);
    }

    #[test]
    fn fill_value_metadata_v2_invalid() {
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#""nan""#).is_err());
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#"[1.0]"#).is_err());
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#"[true, 1.0]"#).is_err());
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#"{"a": 1}"#).is_err());
    }
}
