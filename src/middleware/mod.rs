/*
 * Responsibility
 * - Router-level layers: authorization (authorize) and transport concerns (http)
 */
pub mod authorize;
pub mod http;
