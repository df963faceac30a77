use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use ulid::Ulid;

//--------------------------------------      Coordinate       --------------------------------------------------------
/// A point on the integer grid the service operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: i64,
    pub longitude: i64,
}

impl Coordinate {
    pub fn new(latitude: i64, longitude: i64) -> Self {
        Self { latitude, longitude }
    }

    /// Grid (Manhattan) distance to `other`. Non-negative and monotone in each axis.
    pub fn distance_to(&self, other: Coordinate) -> i64 {
        (self.latitude - other.latitude).abs() + (self.longitude - other.longitude).abs()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

//--------------------------------------        RideId         --------------------------------------------------------
/// A lightweight wrapper around the ULID string identifying a ride.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct RideId(pub String);

impl RideId {
    pub fn random() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RideId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for RideId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for RideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        ChairId        --------------------------------------------------------
/// A lightweight wrapper around the ULID string identifying a chair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ChairId(pub String);

impl ChairId {
    pub fn random() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChairId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ChairId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for ChairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------    RideStatusType     --------------------------------------------------------
/// The lifecycle states of a ride, in order. A ride's current status is always derived from the
/// latest entry in its status-event log; there is no mutable status column anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum RideStatusType {
    /// The ride has been created and is waiting for a chair to be assigned.
    Matching,
    /// A chair has been assigned and is travelling to the pickup coordinate.
    Enroute,
    /// The chair has arrived at the pickup coordinate.
    Pickup,
    /// The rider is on board and the chair is travelling to the destination.
    Carrying,
    /// The chair has arrived at the destination.
    Arrived,
    /// The rider has evaluated the ride. Terminal.
    Completed,
}

impl RideStatusType {
    /// The only status that may legally follow this one. Transitions never skip a state and never
    /// move backwards.
    pub fn next(self) -> Option<RideStatusType> {
        use RideStatusType::*;
        match self {
            Matching => Some(Enroute),
            Enroute => Some(Pickup),
            Pickup => Some(Carrying),
            Carrying => Some(Arrived),
            Arrived => Some(Completed),
            Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == RideStatusType::Completed
    }
}

impl Display for RideStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RideStatusType::Matching => write!(f, "MATCHING"),
            RideStatusType::Enroute => write!(f, "ENROUTE"),
            RideStatusType::Pickup => write!(f, "PICKUP"),
            RideStatusType::Carrying => write!(f, "CARRYING"),
            RideStatusType::Arrived => write!(f, "ARRIVED"),
            RideStatusType::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid ride status: {0}")]
pub struct ConversionError(String);

impl FromStr for RideStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCHING" => Ok(Self::Matching),
            "ENROUTE" => Ok(Self::Enroute),
            "PICKUP" => Ok(Self::Pickup),
            "CARRYING" => Ok(Self::Carrying),
            "ARRIVED" => Ok(Self::Arrived),
            "COMPLETED" => Ok(Self::Completed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------         Ride          --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub rider_id: String,
    /// Set exactly once, by the matching engine, and never cleared afterwards.
    pub chair_id: Option<ChairId>,
    pub pickup_latitude: i64,
    pub pickup_longitude: i64,
    pub destination_latitude: i64,
    pub destination_longitude: i64,
    /// The rider's 1-5 rating, recorded when the ride is completed.
    pub evaluation: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    pub fn pickup(&self) -> Coordinate {
        Coordinate::new(self.pickup_latitude, self.pickup_longitude)
    }

    pub fn destination(&self) -> Coordinate {
        Coordinate::new(self.destination_latitude, self.destination_longitude)
    }
}

//--------------------------------------        NewRide        --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewRide {
    pub rider_id: String,
    pub pickup: Coordinate,
    pub destination: Coordinate,
}

impl NewRide {
    pub fn new<S: Into<String>>(rider_id: S, pickup: Coordinate, destination: Coordinate) -> Self {
        Self { rider_id: rider_id.into(), pickup, destination }
    }
}

//--------------------------------------    RideStatusEvent    --------------------------------------------------------
/// One entry in a ride's append-only status log. The log is ordered by `created_at`, with the
/// ULID `id` as a deterministic tiebreak.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RideStatusEvent {
    pub id: String,
    pub ride_id: RideId,
    pub status: RideStatusType,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      ChairModel       --------------------------------------------------------
/// A chair model. The model fixes the speed constant used in cost estimation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChairModel {
    pub name: String,
    pub speed: i64,
}

impl ChairModel {
    pub fn new<S: Into<String>>(name: S, speed: i64) -> Self {
        Self { name: name.into(), speed }
    }
}

//--------------------------------------         Chair         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chair {
    pub id: ChairId,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    /// The most recently reported coordinate. `None` until the chair reports for the first time,
    /// in which case the chair cannot be scheduled.
    pub last_latitude: Option<i64>,
    pub last_longitude: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chair {
    pub fn last_location(&self) -> Option<Coordinate> {
        match (self.last_latitude, self.last_longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

//--------------------------------------       NewChair        --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewChair {
    pub name: String,
    pub model: String,
}

impl NewChair {
    pub fn new<S: Into<String>, M: Into<String>>(name: S, model: M) -> Self {
        Self { name: name.into(), model: model.into() }
    }
}

//--------------------------------------       FreeChair       --------------------------------------------------------
/// A matching candidate: an active chair with a known location, a positive speed, and no
/// unfinished ride bound to it.
#[derive(Debug, Clone, FromRow)]
pub struct FreeChair {
    pub id: ChairId,
    pub speed: i64,
    pub latitude: i64,
    pub longitude: i64,
}

impl FreeChair {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_distance() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(10, 10);
        assert_eq!(a.distance_to(b), 20);
        assert_eq!(b.distance_to(a), 20);
        assert_eq!(a.distance_to(a), 0);
        assert_eq!(Coordinate::new(-3, 4).distance_to(Coordinate::new(2, -1)), 10);
    }

    #[test]
    fn status_order_is_the_lifecycle_order() {
        use RideStatusType::*;
        let mut status = Matching;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            assert!(next > status);
            seen.push(next);
            status = next;
        }
        assert_eq!(seen, vec![Matching, Enroute, Pickup, Carrying, Arrived, Completed]);
        assert!(Completed.is_terminal());
        assert!(!Arrived.is_terminal());
    }

    #[test]
    fn status_labels_round_trip() {
        use RideStatusType::*;
        for status in [Matching, Enroute, Pickup, Carrying, Arrived, Completed] {
            assert_eq!(status.to_string().parse::<RideStatusType>().unwrap(), status);
        }
        assert!("SLEEPING".parse::<RideStatusType>().is_err());
    }

    #[test]
    fn ride_ids_are_time_sortable() {
        let a = RideId::random();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = RideId::random();
        assert!(a.as_str() < b.as_str());
    }
}
