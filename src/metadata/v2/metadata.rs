use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::metadata::{ConfigurationInvalidError, MetadataConfiguration};

/// Codec metadata with an id and configuration.
///
/// Compressors and filters of Zarr V2 arrays are described by their `numcodecs` id and a flat set of parameters.
/// For example:
/// ```json
/// {
///     "id": "zstd",
///     "level": 5
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: MetadataConfiguration,
}

impl core::fmt::Display for MetadataV2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}",
            serde_json::to_string(self).unwrap_or_else(|_| self.id.clone())
        )
    }
}

impl MetadataV2 {
    /// Create metadata from `id` with an empty configuration.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            configuration: MetadataConfiguration::default(),
        }
    }

    /// Create metadata from `id` and `configuration`.
    ///
    /// An `"id"` key in `configuration` is ignored.
    #[must_use]
    pub fn new_with_configuration(id: &str, mut configuration: MetadataConfiguration) -> Self {
        configuration.remove("id");
        Self {
            id: id.to_string(),
            configuration,
        }
    }

    /// Convert a serializable configuration to [`MetadataV2`].
    ///
    /// # Errors
    /// Returns [`serde_json::Error`] if `configuration` does not serialise to a JSON object.
    pub fn new_with_serializable_configuration<TConfiguration: Serialize>(
        id: &str,
        configuration: &TConfiguration,
    ) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Object(configuration) = serde_json::to_value(configuration)? else {
            return Err(serde::ser::Error::custom(
                "codec configuration must serialise to a JSON object",
            ));
        };
        Ok(Self::new_with_configuration(id, configuration))
    }

    /// Try and convert [`MetadataV2`] to a deserializable configuration.
    ///
    /// # Errors
    /// Returns a [`ConfigurationInvalidError`] if the configuration cannot be converted.
    pub fn to_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, ConfigurationInvalidError> {
        serde_json::from_value(serde_json::Value::Object(self.configuration.clone()))
            .map_err(|_| ConfigurationInvalidError::new(&self.id, self.configuration.clone()))
    }

    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub fn configuration(&self) -> &MetadataConfiguration {
        &self.configuration
    }
}
