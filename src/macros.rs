//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err($crate::error::DecodeError::InvalidData(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::DecodeError::InvalidData(
            format!($fmt, $($arg)+)))
    };
}

macro_rules! unsupported {
    ($e:expr) => {
        return Err($crate::error::DecodeError::Unsupported(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::DecodeError::Unsupported(
            format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
