use crate::geometry::{PointD, PointI};
use crate::line::LineD;
use thiserror::Error;

/// Failures reported by the public operations of this crate.
///
/// Every fallible operation is transactional: on `Err` the observable state of
/// the receiver is unchanged.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    // A required input was empty or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    // A segment collapsed to a point (within the comparison epsilon).
    #[error("degenerate segment {0}")]
    DegenerateSegment(LineD),

    // A polygon with fewer than 3 vertices.
    #[error("polygon has only {0} vertices")]
    PolygonTooSmall(usize),

    // Grid cell outside [0, width) x [0, height).
    #[error("cell {0} outside the grid")]
    CellOutOfBounds(PointI),

    // Polygon shape, orientation, and shift combination outside the grid
    // compatibility matrix.
    #[error("grid does not support {0}")]
    IncompatibleShift(&'static str),

    // No face outlined by the queried polygon.
    #[error("no face matches the polygon near {0}")]
    FaceNotFound(PointD),

    // A point handed to `split_edge` that is not between the edge endpoints.
    #[error("point {0} is not on the edge interior")]
    NotOnEdge(PointD),

    // An edit that would leave the subdivision topologically inconsistent.
    #[error("edit rejected: {0}")]
    TopologyConflict(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
