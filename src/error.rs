// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A precondition on shapes, indices or membership was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

#[test]
fn test_error_display() {
    let e = Error::invalid("vector is not a cycle");
    assert_eq!(e.to_string(), "invalid argument: vector is not a cycle");
    let e = Error::Parse {
        line: 3,
        msg: "expected 2 entries".into(),
    };
    assert_eq!(e.to_string(), "parse error at line 3: expected 2 entries");
}
