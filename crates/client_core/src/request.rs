use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Pending,
    Success(T),
    Failure(ClientError),
}

impl<T> RequestState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ClientError> {
        match self {
            Self::Failure(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

/// Monotonic counter invalidating responses whose triggering state has been
/// superseded. A response is applied only if the token it captured is still
/// current when it completes.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn advance(&mut self) -> GenerationToken {
        self.0 = self.0.wrapping_add(1);
        GenerationToken(self.0)
    }

    pub fn current(&self) -> GenerationToken {
        GenerationToken(self.0)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.0 == token.0
    }
}
