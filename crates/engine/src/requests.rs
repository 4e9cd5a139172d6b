#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitIdeaRequest {
    pub title: String,
    pub description: String,
    pub perfect_state: String,
    pub resource_needs: String,
    pub target_audience: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePollRequest {
    pub title: String,
    pub description: String,
    pub target_audience: String,
}
