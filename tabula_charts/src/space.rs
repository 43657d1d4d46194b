// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A component's answer to an offer of space.
///
/// `width` and `height` never exceed what was offered. A component that would like more
/// than the offer reports the offer (or less) and raises the matching `wants_*` flag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpaceRequest {
    /// Width the component will use.
    pub width: f64,
    /// Height the component will use.
    pub height: f64,
    /// `true` if the component would use more width than offered.
    pub wants_width: bool,
    /// `true` if the component would use more height than offered.
    pub wants_height: bool,
}

impl SpaceRequest {
    /// A request for no space with no unmet wants.
    pub const NONE: Self = Self {
        width: 0.0,
        height: 0.0,
        wants_width: false,
        wants_height: false,
    };

    /// Creates a satisfied request.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            wants_width: false,
            wants_height: false,
        }
    }

    /// Clamps the request to an offer, raising the want flags for any excess.
    pub fn clamp_to(self, offered_width: f64, offered_height: f64) -> Self {
        Self {
            width: self.width.min(offered_width),
            height: self.height.min(offered_height),
            wants_width: self.wants_width || self.width > offered_width,
            wants_height: self.wants_height || self.height > offered_height,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn clamping_marks_excess_as_wanted() {
        let r = SpaceRequest::new(120.0, 10.0).clamp_to(100.0, 100.0);
        assert_eq!(
            r,
            SpaceRequest {
                width: 100.0,
                height: 10.0,
                wants_width: true,
                wants_height: false,
            }
        );
        assert_eq!(SpaceRequest::NONE.clamp_to(0.0, 0.0), SpaceRequest::NONE);
    }
}
