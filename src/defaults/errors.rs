//! HTTP error catalog exposed as named error actions.
//!
//! Each entry registers an error action under `action` and an error route
//! from `identifier` to that action. Codes outside the IANA registry are the
//! widely deployed vendor extensions (nginx, Cloudflare).

use std::sync::Arc;

use serde_json::Value;

use crate::error::{BAD_GATEWAY, BAD_REQUEST, INTERNAL_ERROR, NOT_IMPLEMENTED};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::pipeline::action::{ErrorAction, ErrorActionRegistry, ErrorReply};

/// One catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Error Route Table key.
    pub identifier: &'static str,
    /// Error action name.
    pub action: &'static str,
    pub code: u16,
    pub message: &'static str,
}

const fn entry(
    identifier: &'static str,
    action: &'static str,
    code: u16,
    message: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        identifier,
        action,
        code,
        message,
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    entry(BAD_REQUEST, "badRequest", 400, "Bad Request"),
    entry("Unauthorized", "unauthorized", 401, "Unauthorized"),
    entry("PaymentRequired", "paymentRequired", 402, "Payment Required"),
    entry("Forbidden", "forbidden", 403, "Forbidden"),
    entry("NotFound", "notFound", 404, "Not Found"),
    entry("MethodNotAllowed", "methodNotAllowed", 405, "Method Not Allowed"),
    entry("NotAcceptable", "notAcceptable", 406, "Not Acceptable"),
    entry("ProxyAuthenticationRequired", "proxyAuthenticationRequired", 407, "Proxy Authentication Required"),
    entry("RequestTimeout", "requestTimeout", 408, "Request Timeout"),
    entry("Conflict", "conflict", 409, "Conflict"),
    entry("Gone", "gone", 410, "Gone"),
    entry("LengthRequired", "lengthRequired", 411, "Length Required"),
    entry("PreconditionFailed", "preconditionFailed", 412, "Precondition Failed"),
    entry("PayloadTooLarge", "payloadTooLarge", 413, "Payload Too Large"),
    entry("UriTooLong", "uriTooLong", 414, "URI Too Long"),
    entry("UnsupportedMediaType", "unsupportedMediaType", 415, "Unsupported Media Type"),
    entry("RangeNotSatisfiable", "rangeNotSatisfiable", 416, "Range Not Satisfiable"),
    entry("ExpectationFailed", "expectationFailed", 417, "Expectation Failed"),
    entry("Teapot", "teapot", 418, "I'm a teapot"),
    entry("AuthTimeout", "authTimeout", 419, "Authentication Timeout"),
    entry("MisdirectedRequest", "misdirectedRequest", 421, "Misdirected Request"),
    entry("UnprocessableEntity", "unprocessableEntity", 422, "Unprocessable Entity"),
    entry("Locked", "locked", 423, "Locked"),
    entry("FailedDependency", "failedDependency", 424, "Failed Dependency"),
    entry("TooEarly", "tooEarly", 425, "Too Early"),
    entry("UpgradeRequired", "upgradeRequired", 426, "Upgrade Required"),
    entry("PreconditionRequired", "preconditionRequired", 428, "Precondition Required"),
    entry("TooManyRequests", "tooManyRequests", 429, "Too Many Requests"),
    entry("LargeHeaders", "largeHeaders", 431, "Request Header Fields Too Large"),
    entry("RetryWith", "retryWith", 449, "Retry With"),
    entry("UnavailableReasons", "unavailableReasons", 451, "Unavailable For Legal Reasons"),
    entry("ClientClosedRequest", "clientClosedRequest", 499, "Client Closed Request"),
    entry(INTERNAL_ERROR, "internalError", 500, "Internal Server Error"),
    entry(NOT_IMPLEMENTED, "notImplemented", 501, "Not Implemented"),
    entry(BAD_GATEWAY, "badGateway", 502, "Bad Gateway"),
    entry("UnavailableService", "unavailableService", 503, "Service Unavailable"),
    entry("GatewayTimeout", "gatewayTimeout", 504, "Gateway Timeout"),
    entry("NotSupported", "notSupported", 505, "HTTP Version Not Supported"),
    entry("VariantAlsoNegotiates", "variantAlsoNegotiates", 506, "Variant Also Negotiates"),
    entry("InsufficientStorage", "insufficientStorage", 507, "Insufficient Storage"),
    entry("LoopDetected", "loopDetected", 508, "Loop Detected"),
    entry("BandwidthLimitExceeded", "bandwidthLimitExceeded", 509, "Bandwidth Limit Exceeded"),
    entry("NotExtended", "notExtended", 510, "Not Extended"),
    entry("NetworkAuthRequired", "networkAuthRequired", 511, "Network Authentication Required"),
    entry("UnknownError", "unknownError", 520, "Unknown Error"),
    entry("WebServerIsDown", "webServerIsDown", 521, "Web Server Is Down"),
    entry("ConnectionTimedOut", "connectionTimedOut", 522, "Connection Timed Out"),
    entry("OriginUnreachable", "originUnreachable", 523, "Origin Is Unreachable"),
    entry("TimeoutOccurred", "timeoutOccurred", 524, "A Timeout Occurred"),
    entry("SslHandshakeFailed", "sslHandshakeFailed", 525, "SSL Handshake Failed"),
    entry("InvalidSsl", "invalidSsl", 526, "Invalid SSL Certificate"),
];

/// Catalog row for an error route identifier.
pub fn lookup(identifier: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.identifier == identifier)
}

/// Error action answering with a fixed code and message.
pub fn fixed(code: u16, message: &'static str) -> ErrorAction {
    Arc::new(move |_: &Request, _: &Response, _: &Value| ErrorReply::new(code, message))
}

/// The action used when nothing else resolves: 502 Bad Gateway.
pub fn bad_gateway() -> ErrorAction {
    fixed(502, "Bad Gateway")
}

/// Every catalog row as a registered error action.
pub fn error_actions() -> ErrorActionRegistry {
    let mut registry = ErrorActionRegistry::new();
    for entry in CATALOG {
        registry.register(entry.action, fixed(entry.code, entry.message));
    }
    registry
}

/// Every catalog row as an error route.
pub fn error_routes() -> impl Iterator<Item = (String, String)> {
    CATALOG
        .iter()
        .map(|e| (e.identifier.to_string(), e.action.to_string()))
}
