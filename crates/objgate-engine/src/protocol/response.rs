//! Response lines

use std::io::Write;

use super::codec::escape;
use super::return_object::ReturnObject;
use super::{
    CLASS_TYPE, END_OUTPUT, FATAL_ERROR, METHOD_TYPE, NO_MEMBER, PACKAGE_TYPE, RETURN_MESSAGE,
    STRING_TYPE, SUCCESS,
};
use crate::error::GatewayResult;

/// Kind of a member found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// A static method
    Method,
    /// A class, by fully-qualified name
    Class(String),
    /// A package
    Package,
}

/// One response line
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A tagged result
    Return(ReturnObject),
    /// The named field does not exist
    NoSuchField,
    /// A member lookup result
    Member(MemberKind),
    /// Fatal error; the connection closes after it
    Fatal(String),
}

impl From<ReturnObject> for Response {
    fn from(value: ReturnObject) -> Self {
        Response::Return(value)
    }
}

impl Response {
    /// Full line including the return prefix and end-of-output marker
    pub fn encode(&self) -> String {
        let body = match self {
            Response::Return(value) => value.encode(),
            Response::NoSuchField => format!("{}{}", SUCCESS, NO_MEMBER),
            Response::Member(MemberKind::Method) => format!("{}{}", SUCCESS, METHOD_TYPE),
            Response::Member(MemberKind::Class(fqn)) => format!("{}{}{}", SUCCESS, CLASS_TYPE, fqn),
            Response::Member(MemberKind::Package) => format!("{}{}", SUCCESS, PACKAGE_TYPE),
            Response::Fatal(message) => format!("{}{}{}", FATAL_ERROR, STRING_TYPE, escape(message)),
        };
        format!("{}{}{}", RETURN_MESSAGE, body, END_OUTPUT)
    }

    /// Write and flush
    pub fn write_to(&self, out: &mut dyn Write) -> GatewayResult<()> {
        out.write_all(self.encode().as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(Response::NoSuchField.encode(), "!yo\n");
        assert_eq!(Response::Return(ReturnObject::Void).encode(), "!yv\n");
        assert_eq!(Response::Member(MemberKind::Method).encode(), "!ym\n");
        assert_eq!(
            Response::Member(MemberKind::Class("demo.Counter".into())).encode(),
            "!ycdemo.Counter\n"
        );
        assert_eq!(Response::Member(MemberKind::Package).encode(), "!yp\n");
        assert_eq!(Response::Fatal("boom".into()).encode(), "!zsboom\n");
    }
}
