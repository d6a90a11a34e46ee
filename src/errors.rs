use failure::Error;

/// Failures raised by the drivers themselves, as opposed to those passed
/// through from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum DriverError {
    #[fail(display = "invalid parameter: {}", _0)]
    InvalidParameter(String),
    #[fail(display = "could not parse response: {}", _0)]
    ParseError(String),
}

pub fn invalid_parameter<S: Into<String>>(message: S) -> Error {
    DriverError::InvalidParameter(message.into()).into()
}

pub fn parse_error<S: Into<String>>(message: S) -> Error {
    DriverError::ParseError(message.into()).into()
}

/// Returns the driver error behind `err`, if it is one.
pub fn driver_error(err: &Error) -> Option<&DriverError> {
    err.downcast_ref::<DriverError>()
}
