//! Boundary converters between native sensor vocabulary and domain types.
//!
//! Both mappings are total: every native input has a defined output, so no
//! failure modes exist at this boundary.

use wayfinder_domain::{Accuracy, AuthorizationStatus};

use crate::ports::outbound::{
    NativeAuthorizationStatus, ACCURACY_BEST, ACCURACY_BEST_FOR_NAVIGATION,
    ACCURACY_HUNDRED_METERS, ACCURACY_KILOMETER, ACCURACY_NEAREST_TEN_METERS,
    ACCURACY_THREE_KILOMETERS,
};

/// Translate the platform's native authorization state.
///
/// `Restricted` collapses into `Denied` by policy: the application cannot
/// tell them apart and neither will ever deliver readings.
pub fn authorization_status_from_native(
    native: NativeAuthorizationStatus,
) -> AuthorizationStatus {
    match native {
        NativeAuthorizationStatus::AuthorizedAlways => AuthorizationStatus::AuthorizedAlways,
        NativeAuthorizationStatus::AuthorizedWhenInUse => {
            AuthorizationStatus::AuthorizedWhenInUse
        }
        NativeAuthorizationStatus::NotDetermined => AuthorizationStatus::NotDetermined,
        NativeAuthorizationStatus::Restricted | NativeAuthorizationStatus::Denied => {
            AuthorizationStatus::Denied
        }
    }
}

/// Map an accuracy level to the platform's numeric precision constant.
pub fn desired_accuracy_value(accuracy: Accuracy) -> f64 {
    match accuracy {
        Accuracy::BestForNavigation => ACCURACY_BEST_FOR_NAVIGATION,
        Accuracy::Best => ACCURACY_BEST,
        Accuracy::NearestTenMeters => ACCURACY_NEAREST_TEN_METERS,
        Accuracy::HundredMeters => ACCURACY_HUNDRED_METERS,
        Accuracy::Kilometer => ACCURACY_KILOMETER,
        Accuracy::ThreeKilometers => ACCURACY_THREE_KILOMETERS,
    }
}
