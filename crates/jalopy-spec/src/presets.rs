//! Built-in vehicle specs.
//!
//! `hatchback` is the reference model used by the demo app and the test
//! suites: four seats, four wheels, rear-wheel drive, and the full set of
//! thirteen damage-tracked panels.

use crate::types::{
    HandlingData, HingeSpec, PanelKind, PanelSpec, SeatSpec, SuspensionSpec, VehicleSpec, WheelSpec,
};

fn door(kind: PanelKind, offset: [f32; 3]) -> PanelSpec {
    // Left-side doors swing positive about +y, right-side negative.
    let outward = if offset[0] < 0.0 {
        [0.0, 1.4]
    } else {
        [-1.4, 0.0]
    };
    PanelSpec {
        kind,
        offset,
        hinge: Some(HingeSpec {
            axis: [0.0, 1.0, 0.0],
            swing_limits: outward,
            half_extents: [0.05, 0.4, 0.45],
            mass: 15.0,
        }),
    }
}

fn cosmetic(kind: PanelKind, offset: [f32; 3]) -> PanelSpec {
    PanelSpec {
        kind,
        offset,
        hinge: None,
    }
}

/// Four-door hatchback, rear-wheel drive.
pub fn hatchback() -> VehicleSpec {
    VehicleSpec {
        name: "hatchback".into(),
        handling: HandlingData {
            mass: 1200.0,
            half_extents: [0.9, 0.55, 2.1],
            centre_of_mass: [0.0, -0.25, 0.0],
            suspension: SuspensionSpec::default(),
            ..HandlingData::default()
        },
        seats: vec![
            SeatSpec {
                offset: [-0.35, 0.05, -0.2],
            },
            SeatSpec {
                offset: [0.35, 0.05, -0.2],
            },
            SeatSpec {
                offset: [-0.35, 0.05, 0.6],
            },
            SeatSpec {
                offset: [0.35, 0.05, 0.6],
            },
        ],
        wheels: vec![
            WheelSpec {
                offset: [-0.75, -0.45, -1.25],
                steerable: true,
                driven: false,
            },
            WheelSpec {
                offset: [0.75, -0.45, -1.25],
                steerable: true,
                driven: false,
            },
            WheelSpec {
                offset: [-0.75, -0.45, 1.25],
                steerable: false,
                driven: true,
            },
            WheelSpec {
                offset: [0.75, -0.45, 1.25],
                steerable: false,
                driven: true,
            },
        ],
        panels: vec![
            PanelSpec {
                kind: PanelKind::Bonnet,
                offset: [0.0, 0.35, -1.6],
                hinge: Some(HingeSpec {
                    axis: [1.0, 0.0, 0.0],
                    swing_limits: [0.0, 1.2],
                    half_extents: [0.7, 0.03, 0.5],
                    mass: 18.0,
                }),
            },
            door(PanelKind::DoorFrontLeft, [-0.92, 0.1, -0.45]),
            door(PanelKind::DoorFrontRight, [0.92, 0.1, -0.45]),
            door(PanelKind::DoorRearLeft, [-0.92, 0.1, 0.45]),
            door(PanelKind::DoorRearRight, [0.92, 0.1, 0.45]),
            PanelSpec {
                kind: PanelKind::Boot,
                offset: [0.0, 0.4, 1.95],
                hinge: Some(HingeSpec {
                    axis: [1.0, 0.0, 0.0],
                    swing_limits: [0.0, 1.1],
                    half_extents: [0.7, 0.03, 0.4],
                    mass: 16.0,
                }),
            },
            cosmetic(PanelKind::Windscreen, [0.0, 0.5, -0.8]),
            cosmetic(PanelKind::BumperFront, [0.0, -0.25, -2.05]),
            cosmetic(PanelKind::BumperRear, [0.0, -0.25, 2.05]),
            cosmetic(PanelKind::WingFrontLeft, [-0.85, 0.0, -1.4]),
            cosmetic(PanelKind::WingFrontRight, [0.85, 0.0, -1.4]),
            cosmetic(PanelKind::WingRearLeft, [-0.85, 0.0, 1.4]),
            cosmetic(PanelKind::WingRearRight, [0.85, 0.0, 1.4]),
        ],
        float_points: Vec::new(),
        entry_clearance: [0.81756252, 0.486281008, -0.34800607],
    }
}
