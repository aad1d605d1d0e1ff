// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/present-commands/*, /api/present-query/*
// Middleware: request cancellation + JWT validation (AuthUser in extensions)
//
// Handlers receive AppState through State and the request's CancellationToken
// through Extension. Core failures convert into ApiError with `?`.

pub mod presents;
