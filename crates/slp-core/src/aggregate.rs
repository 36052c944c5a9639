//! # Route and Pool Aggregates
//!
//! Arithmetic behind the pool-orders and route-orders reads: totals from
//! parcel dimensions and matrix durations, the closed-tour leg chain for a
//! route, and the GIVE/TAKE action label shown per leg.

use serde::{Deserialize, Serialize};

/// Point type of a depot (distribution center).
pub const POINT_DC: &str = "DC";
/// Point type of a pick-up point.
pub const POINT_PUP: &str = "PUP";
/// Mile type of a pickup leg.
pub const FIRST_MILE: &str = "FIRST_MILE";
/// Mile type of a delivery leg.
pub const LAST_MILE: &str = "LAST_MILE";

/// A leg endpoint as stored in the `point` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegPoint {
    #[serde(rename = "type")]
    pub point_type: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Parcel dimensions. Missing values count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub weight: f64,
}

impl Dimension {
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.length
    }
}

/// Totals attached to an aggregate envelope.
///
/// `dimensional_weight` keeps its snake_case key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteTotals {
    pub weight: f64,
    pub volume: f64,
    pub dimensional_weight: f64,
    pub distance: f64,
    pub serve: f64,
}

/// Sum up an aggregate.
///
/// `durations` are the per-target matrix durations; each one is charged the
/// company's `point_serve_time` on top. A zero `density` yields a
/// non-finite dimensional weight, which serializes as `null`.
pub fn compute_totals(
    dimensions: &[Dimension],
    durations: &[f64],
    point_serve_time: f64,
    density: f64,
    distance: f64,
) -> RouteTotals {
    let weight = dimensions.iter().map(|d| d.weight).sum();
    let volume: f64 = dimensions.iter().map(Dimension::volume).sum();
    let serve = durations.iter().map(|d| d + point_serve_time).sum();

    RouteTotals {
        weight,
        volume,
        dimensional_weight: volume / density,
        distance,
        serve,
    }
}

/// What the courier does at a leg's destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Give,
    Take,
}

impl ActionType {
    /// Pool view: handing over at a DC or PUP is a GIVE.
    pub fn for_destination(to_type: &str) -> Self {
        if to_type == POINT_DC || to_type == POINT_PUP {
            Self::Give
        } else {
            Self::Take
        }
    }

    /// Route view: a leg that starts at a DC is a GIVE.
    pub fn for_origin(from_type: &str) -> Self {
        if from_type == POINT_DC {
            Self::Give
        } else {
            Self::Take
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Give => "GIVE",
            Self::Take => "TAKE",
        }
    }
}

/// One hop of a chained tour. The closing hop has no order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourLeg<O> {
    pub from: LegPoint,
    pub to: LegPoint,
    pub order: Option<O>,
}

/// A stored leg: origin, destination and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLeg<O> {
    pub from: LegPoint,
    pub to: LegPoint,
    pub order: O,
}

/// Chain stored legs (ordered by position) into a closed tour.
///
/// - The first hop is oriented away from the DC.
/// - Each later hop starts where the previous one ended. It heads to the
///   stored origin when that origin has the same point type as the previous
///   destination, otherwise to the stored destination.
/// - A final hop returns to the tour's start.
///
/// An empty input yields an empty tour.
pub fn chain_legs<O: Clone>(legs: &[StoredLeg<O>]) -> Vec<TourLeg<O>> {
    let mut tour: Vec<TourLeg<O>> = Vec::with_capacity(legs.len() + 1);

    for leg in legs {
        let hop = match tour.last() {
            None if leg.from.point_type == POINT_DC => TourLeg {
                from: leg.from.clone(),
                to: leg.to.clone(),
                order: Some(leg.order.clone()),
            },
            None => TourLeg {
                from: leg.to.clone(),
                to: leg.from.clone(),
                order: Some(leg.order.clone()),
            },
            Some(prev) => {
                let to = if leg.from.point_type == prev.to.point_type {
                    leg.from.clone()
                } else {
                    leg.to.clone()
                };
                TourLeg {
                    from: prev.to.clone(),
                    to,
                    order: Some(leg.order.clone()),
                }
            }
        };
        tour.push(hop);
    }

    if let (Some(first), Some(last)) = (tour.first(), tour.last()) {
        let closing = TourLeg {
            from: last.to.clone(),
            to: first.from.clone(),
            order: None,
        };
        tour.push(closing);
    }

    tour
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(kind: &str, id: &str) -> LegPoint {
        LegPoint {
            point_type: kind.into(),
            source_id: Some(id.into()),
            latitude: Some(1.0),
            longitude: Some(2.0),
        }
    }

    fn leg(from: LegPoint, to: LegPoint, order: u32) -> StoredLeg<u32> {
        StoredLeg { from, to, order }
    }

    #[test]
    fn totals_sum_dimensions_and_durations() {
        let dims = [
            Dimension {
                width: 1.0,
                height: 2.0,
                length: 3.0,
                weight: 4.0,
            },
            Dimension {
                width: 2.0,
                height: 2.0,
                length: 2.0,
                weight: 1.5,
            },
        ];
        let totals = compute_totals(&dims, &[10.0, 20.0, 30.0], 5.0, 2.0, 1234.0);
        assert_eq!(totals.weight, 5.5);
        assert_eq!(totals.volume, 14.0);
        assert_eq!(totals.dimensional_weight, 7.0);
        assert_eq!(totals.serve, 75.0);
        assert_eq!(totals.distance, 1234.0);
    }

    #[test]
    fn totals_keep_snake_case_key() {
        let json = serde_json::to_value(compute_totals(&[], &[], 0.0, 1.0, 0.0)).unwrap();
        assert!(json.get("dimensional_weight").is_some());
    }

    #[test]
    fn action_types() {
        assert_eq!(ActionType::for_destination("DC"), ActionType::Give);
        assert_eq!(ActionType::for_destination("PUP"), ActionType::Give);
        assert_eq!(ActionType::for_destination("CLIENT"), ActionType::Take);
        assert_eq!(ActionType::for_origin("DC"), ActionType::Give);
        assert_eq!(ActionType::for_origin("PUP"), ActionType::Take);
        assert_eq!(serde_json::to_value(ActionType::Give).unwrap(), "GIVE");
    }

    #[test]
    fn tour_starts_at_dc_and_closes() {
        let dc = point("DC", "dc");
        let a = point("CLIENT", "a");
        let b = point("CLIENT", "b");
        let legs = vec![leg(dc.clone(), a.clone(), 1), leg(dc.clone(), b.clone(), 2)];

        let tour = chain_legs(&legs);
        assert_eq!(tour.len(), 3);
        assert_eq!(tour[0].from, dc);
        assert_eq!(tour[0].to, a);
        // DC != CLIENT, so the second hop heads to the stored destination.
        assert_eq!(tour[1].from, a);
        assert_eq!(tour[1].to, b);
        assert_eq!(tour[1].order, Some(2));
        assert_eq!(tour[2].from, b);
        assert_eq!(tour[2].to, dc);
        assert!(tour[2].order.is_none());
    }

    #[test]
    fn first_leg_not_from_dc_is_reversed() {
        let dc = point("DC", "dc");
        let a = point("CLIENT", "a");
        let tour = chain_legs(&[leg(a.clone(), dc.clone(), 7)]);
        assert_eq!(tour[0].from, dc);
        assert_eq!(tour[0].to, a);
        assert_eq!(tour[1].from, a);
        assert_eq!(tour[1].to, dc);
    }

    #[test]
    fn matching_origin_type_heads_to_origin() {
        let dc = point("DC", "dc");
        let a = point("CLIENT", "a");
        let c = point("CLIENT", "c");
        let tour = chain_legs(&[leg(dc.clone(), a.clone(), 1), leg(c.clone(), dc.clone(), 2)]);
        assert_eq!(tour[1].from, a);
        assert_eq!(tour[1].to, c);
    }

    #[test]
    fn empty_tour() {
        assert!(chain_legs::<u32>(&[]).is_empty());
    }
}
