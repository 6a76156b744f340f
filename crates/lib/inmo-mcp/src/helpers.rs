use std::borrow::Cow;

use inmo_core::control::ControlError;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub fn invalid_params(message: impl Into<Cow<'static, str>>) -> ErrorData {
    mcp_err(ErrorCode::INVALID_PARAMS, message)
}

pub fn map_control_err(err: ControlError) -> ErrorData {
    match err {
        ControlError::UnknownCollection(_) | ControlError::InvalidInput(_) => {
            invalid_params(err.to_string())
        }
        ControlError::Store(_) => mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()),
    }
}
