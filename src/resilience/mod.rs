//! Resilience layer: circuit breaker protection for SP-API calls.

mod circuit_breaker;


pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerHook, CircuitState};
