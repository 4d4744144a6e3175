//! Value objects - immutable types defined by their values

mod chat_request;
mod clock;
mod match_status;
mod snowflake;

pub use chat_request::ChatRequestState;
pub use clock::{format_clock, relative_age};
pub use match_status::{MatchStatus, MatchTransition};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
