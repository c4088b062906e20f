//! Points of sale around Milan used across the integration tests.

use pos_route_planner::model::{Pos, RouteResult, RouteStop};

/// Static description of a fixture POS.
#[derive(Debug, Clone)]
pub struct PosFixture {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub city: &'static str,
    pub territory: &'static str,
    pub segment: &'static str,
}

impl PosFixture {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        address: &'static str,
        city: &'static str,
        territory: &'static str,
        segment: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            address,
            city,
            territory,
            segment,
        }
    }

    pub fn to_pos(&self) -> Pos {
        let mut pos = Pos::new(self.id, self.name);
        pos.address = self.address.to_string();
        pos.city = self.city.to_string();
        pos.province = "MI".to_string();
        pos.territory = self.territory.to_string();
        pos.segment = self.segment.to_string();
        pos
    }
}

pub const MILAN_POS: &[PosFixture] = &[
    PosFixture::new("101", "Bar Magenta", "Via Carducci 13", "Milano", "Milano Centro", "bar"),
    PosFixture::new("102", "Tabaccheria Brera", "Via Fiori Chiari 2", "Milano", "Milano Centro", "tabacchi"),
    PosFixture::new("103", "Edicola Duomo", "Piazza del Duomo 1", "Milano", "Milano Centro", "edicola"),
    PosFixture::new("201", "Caffè Navigli", "Alzaia Naviglio Grande 36", "Milano", "Milano Sud", "bar"),
    PosFixture::new("202", "Tabacchi Porta Romana", "Corso di Porta Romana 98", "Milano", "Milano Sud", "tabacchi"),
    PosFixture::new("301", "Bar Stazione Monza", "Piazza Castello 4", "Monza", "Brianza", "bar"),
];

pub fn all_pos() -> Vec<Pos> {
    MILAN_POS.iter().map(PosFixture::to_pos).collect()
}

pub fn pos(id: &str) -> Pos {
    MILAN_POS
        .iter()
        .find(|fixture| fixture.id == id)
        .map(PosFixture::to_pos)
        .unwrap_or_else(|| panic!("unknown fixture POS {}", id))
}

/// A plausible optimizer answer visiting `positions` in order, starting at
/// 09:00 with 30 minute visits and 15 minutes / 4 km between stops.
pub fn route_through(positions: &[Pos]) -> RouteResult {
    let mut clock = 9 * 60;
    let mut stops = Vec::with_capacity(positions.len());
    for (index, pos) in positions.iter().enumerate() {
        let is_last = index + 1 == positions.len();
        let arrival = clock;
        let departure = arrival + 30;
        stops.push(RouteStop {
            pos_id: Some(pos.id.clone()),
            name: pos.name.clone(),
            address: pos.full_address(),
            arrival_time: hhmm(arrival),
            visit_duration: 30,
            departure_time: hhmm(departure),
            distance_to_next: (!is_last).then_some(4.0),
            travel_time_to_next: (!is_last).then_some(15),
        });
        clock = departure + 15;
    }

    let legs = positions.len().saturating_sub(1) as u32;
    RouteResult {
        stops,
        total_time: positions.len() as u32 * 30 + legs * 15,
        total_distance: f64::from(legs) * 4.0,
    }
}

fn hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
