pub mod cart_service;
pub mod confirmation_service;
pub mod hydration_service;
pub mod payment_service;
pub mod shipping_service;
pub mod tracking_service;
