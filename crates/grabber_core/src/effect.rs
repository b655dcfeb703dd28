#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartJob { urls: Vec<String> },
    CancelJob,
}
