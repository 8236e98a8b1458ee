use http::StatusCode;

/// Human-readable description for a failed response status.
pub(super) fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::FOUND => "Interface redirected.",
        StatusCode::BAD_REQUEST => "Request error: the parameters were incorrect.",
        StatusCode::UNAUTHORIZED => "Not authorized; please sign in again.",
        StatusCode::FORBIDDEN => "Access to this resource is forbidden.",
        StatusCode::NOT_FOUND => "The requested resource does not exist.",
        StatusCode::METHOD_NOT_ALLOWED => "Request method not allowed.",
        StatusCode::REQUEST_TIMEOUT => "The request timed out.",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error.",
        StatusCode::NOT_IMPLEMENTED => "Service not implemented.",
        StatusCode::BAD_GATEWAY => "Gateway error.",
        StatusCode::SERVICE_UNAVAILABLE => "Service unavailable.",
        StatusCode::GATEWAY_TIMEOUT => "Gateway timeout.",
        StatusCode::HTTP_VERSION_NOT_SUPPORTED => "HTTP version not supported.",
        _ => "Request failed.",
    }
}
