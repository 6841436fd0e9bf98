use thiserror::Error;

#[derive(Debug, Error)]
pub enum LottoError {
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("unknown game code `{0}`")]
    UnknownGame(String),
    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("blank line")]
    Blank,
    #[error("only {0} fields")]
    TooFewFields(usize),
    #[error("no supported game named in first field")]
    UnknownGame,
    #[error("date field `{0}` is not a full calendar date")]
    BadDate(String),
    #[error("only {0} draw numbers")]
    TooFewNumbers(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemSkip {
    #[error("item has no usable lotteryDate")]
    UnusableDate,
    #[error("item has no whole-number draw numbers")]
    EmptyNumbers,
}

#[derive(Debug, Error)]
pub enum MemberSkip {
    #[error("failed to read member: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to open member: {0}")]
    Open(#[from] zip::result::ZipError),
    #[error("no encoding in the fallback chain decodes the member")]
    Undecodable,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),
    #[error("transport failure: {0}")]
    Transport(reqwest::Error),
    #[error("non-success status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Body(String),
    #[error("api reported rtCode={0}")]
    Api(i64),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Transport(err)
        }
    }
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Body(_) => "body",
            FetchError::Api(_) => "api_error",
        }
    }
}
