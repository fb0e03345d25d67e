// ABOUTME: Named outputs of a successfully deployed stack.
// ABOUTME: Empty until a terminal successful deploy; absence means not deployed.

use std::collections::BTreeMap;

/// Output key holding the service endpoint URL.
pub const OUTPUT_ENDPOINT: &str = "EndpointUrl";

/// Output key holding the deployed function's name.
pub const OUTPUT_FUNCTION_NAME: &str = "FunctionName";

/// Read-only key→value map of stack outputs.
///
/// Populated only after a terminal successful deploy. Consumers must treat
/// a missing key as "not yet deployed" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentOutputs(BTreeMap<String, String>);

impl DeploymentOutputs {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The deployed service endpoint, if the deploy has completed.
    pub fn endpoint(&self) -> Option<&str> {
        self.get(OUTPUT_ENDPOINT).filter(|v| !v.is_empty())
    }

    /// The deployed function identifier, if the deploy has completed.
    pub fn function_name(&self) -> Option<&str> {
        self.get(OUTPUT_FUNCTION_NAME).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
