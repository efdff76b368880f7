/// Custom error type for talking to the model provider & validating its research output.
#[derive(Debug)]
pub enum Error {
    /// Request to the provider never produced an HTTP response (network, TLS, timeout).
    HttpError(reqwest::Error),

    /// Provider answered with an error body, or with a body we could not deserialize.
    ProviderError(async_openai::error::OpenAIError),

    /// Provider answered with something that is not a usable background-job response.
    UnexpectedResponse(String),

    /// Internal error: prompt substitution failed.
    PromptCreationFailure(subst::Error),

    /// Research output is not valid JSON, even after removing markdown fences.
    InvalidPayload(serde_json::Error),

    /// Research output is valid JSON but not a JSON object.
    PayloadNotAnObject,

    /// Research output is missing some of the expected fields.
    IncompletePayload(Vec<String>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::HttpError(err) => write!(f, "HTTP error: {}", err),
            Error::ProviderError(err) => write!(f, "Provider error: {}", err),
            Error::UnexpectedResponse(msg) => write!(f, "Unexpected provider response: {}", msg),
            Error::PromptCreationFailure(err) => write!(f, "Failed to create prompt: {}", err),
            Error::InvalidPayload(err) => write!(f, "Model did not return valid JSON: {}", err),
            Error::PayloadNotAnObject => write!(f, "Model did not return a JSON object"),
            Error::IncompletePayload(missing) => {
                write!(f, "Model output is missing fields: {}", missing.join(", "))
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::HttpError(err)
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Error::ProviderError(err)
    }
}

impl From<subst::Error> for Error {
    fn from(err: subst::Error) -> Self {
        Error::PromptCreationFailure(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidPayload(err)
    }
}
