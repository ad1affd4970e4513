/// Application name
pub const APP_NAME: &str = "Mentora";

/// Sign-in page; protected paths redirect here when nobody is signed in
pub const LOGIN_PATH: &str = "/login";

/// Email verification page
pub const VERIFY_EMAIL_PATH: &str = "/verify-email";

/// Profile page; reachable even while the profile is incomplete
pub const PROFILE_PATH: &str = "/profile";

/// Durable client slot holding the id of the booking awaiting payment
pub const SLOT_PENDING_BOOKING_ID: &str = "pendingBookingId";

/// Durable client slot set by the payment redirect ("true" when paid)
pub const SLOT_PAYMENT_SUCCESS: &str = "paymentSuccess";

/// Durable client slot with the payment reference from the redirect
pub const SLOT_PAYMENT_REFERENCE: &str = "paymentReference";

/// Default merchant button for paid sessions
pub const DEFAULT_SESSION_BUTTON_ID: &str = "pl_QVF8JctVh7OEfL";

/// Default merchant button for paid mentor services
pub const DEFAULT_MENTOR_BUTTON_ID: &str = "pl_QZQCMR4tWobPfx";
