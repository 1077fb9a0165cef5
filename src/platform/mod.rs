//! Platform abstraction layer
//!
//! Host class detection. Mobile-class hosts get a lower frame cap and fewer
//! clouds.

/// Mobile-class user agents contain "mobi" or "android" in any case
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ua.contains("mobi") || ua.contains("android")
}

/// Whether the current host is mobile-class (never on native)
#[cfg(target_arch = "wasm32")]
pub fn is_mobile() -> bool {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .map(|ua| is_mobile_user_agent(&ua))
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn is_mobile() -> bool {
    false
}

/// Current high-resolution time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
