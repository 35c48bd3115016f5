//! Textual tags for [`ArgType`].
//!
//! Scalars use the lowercase element name (`int32`), buffers wrap it
//! (`buffer<float32>`) and queues are `stream`. Parsing is the exact inverse of
//! formatting and rejects anything else, including surrounding whitespace.

use std::fmt;
use std::str::FromStr;

use snafu::OptionExt;

use crate::error::{Error, UnknownTagSnafu};
use crate::{ArgType, ScalarType};

const STREAM: &str = "stream";

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Buffer(element) => write!(f, "buffer<{element}>"),
            Self::Stream => f.write_str(STREAM),
        }
    }
}

impl FromStr for ArgType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        if tag == STREAM {
            return Ok(Self::Stream);
        }

        if let Some(inner) = tag.strip_prefix("buffer<").and_then(|rest| rest.strip_suffix('>')) {
            let element = parse_scalar(inner).context(UnknownTagSnafu { tag })?;
            return Ok(Self::Buffer(element));
        }

        parse_scalar(tag).map(Self::Scalar).context(UnknownTagSnafu { tag })
    }
}

fn parse_scalar(tag: &str) -> Option<ScalarType> {
    ScalarType::from_str(tag).ok()
}
