//! Unit tests for acc-search.
//!
//! All tests use hand-built networks; nothing touches the filesystem.

#[cfg(test)]
mod helpers {
    use acc_core::{Coord, EdgeId, ModeRegistry, ModeSet, ObjectId};
    use acc_network::{LocatedObject, Network, NetworkBuilder, ObjectLayer};

    pub fn modes() -> ModeRegistry {
        ModeRegistry::standard()
    }

    pub fn set(reg: &ModeRegistry, names: &[&str]) -> ModeSet {
        reg.resolve(names).unwrap()
    }

    /// `n` two-way foot segments of `len` metres at 1 m/s in a straight
    /// line.  Returns the network and the forward edge of each segment.
    pub fn line(n: usize, len: f64) -> (Network, Vec<EdgeId>) {
        let foot = set(&modes(), &["foot"]);
        let mut b = NetworkBuilder::new();
        let nodes: Vec<_> = (0..=n)
            .map(|i| b.add_node(Coord::new(i as f64 * len, 0.0)))
            .collect();
        let forward = nodes
            .windows(2)
            .map(|w| b.add_road(w[0], w[1], len, 1.0, foot).0)
            .collect();
        (b.build().unwrap(), forward)
    }

    pub fn at(id: u64, edge: EdgeId, offset: f64) -> LocatedObject {
        LocatedObject::new(ObjectId(id), edge, offset, 1.0)
    }

    pub fn layer(net: &Network, objects: Vec<LocatedObject>) -> ObjectLayer {
        ObjectLayer::new(net, objects).unwrap()
    }

    pub fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }
}

// ── Weight functions ──────────────────────────────────────────────────────────

#[cfg(test)]
mod weight {
    use std::cmp::Ordering;

    use crate::{LabelCost, SearchError, WeightConfig, WeightFunction, WeightKind};

    fn cost(tt: f64, ic: u32) -> LabelCost {
        LabelCost { travel_time: tt, distance: tt, interchanges: ic, ..LabelCost::default() }
    }

    #[test]
    fn travel_time_prefers_more_remaining_modes() {
        let w = WeightFunction::TravelTimeModes;
        let few  = LabelCost { remaining_modes: 1, ..cost(100.0, 0) };
        let many = LabelCost { remaining_modes: 3, ..cost(100.0, 0) };
        assert_eq!(w.compare(&many, &few), Ordering::Less);
        assert_eq!(w.compare(&cost(50.0, 0), &many), Ordering::Less);
    }

    #[test]
    fn price_before_time() {
        let w = WeightFunction::PriceTravelTime;
        let cheap_slow = LabelCost { price: 0.0, ..cost(900.0, 0) };
        let dear_fast  = LabelCost { price: 2.0, ..cost(10.0, 0) };
        assert_eq!(w.compare(&cheap_slow, &dear_fast), Ordering::Less);
    }

    #[test]
    fn interchange_penalty_is_exponential() {
        let w = WeightFunction::InterchangePenalty { factor: 2.0 };
        // 100 · 2² = 400 > 300 · 2⁰
        assert_eq!(w.compare(&cost(300.0, 0), &cost(100.0, 2)), Ordering::Less);
        // 100 · 2¹ = 200 < 300
        assert_eq!(w.compare(&cost(100.0, 1), &cost(300.0, 0)), Ordering::Less);
    }

    #[test]
    fn over_ceiling_always_worse() {
        let w = WeightFunction::MaxInterchanges { max: 2 };
        assert_eq!(w.compare(&cost(5_000.0, 2), &cost(10.0, 3)), Ordering::Less);
        assert_eq!(w.compare(&cost(10.0, 1), &cost(20.0, 0)), Ordering::Less);
    }

    #[test]
    fn config_requires_parameters() {
        assert!(matches!(
            WeightConfig::new(WeightKind::InterchangePenalty).to_function(),
            Err(SearchError::InvalidWeight(_))
        ));
        let low = WeightConfig { factor: Some(0.5), ..WeightConfig::new(WeightKind::InterchangePenalty) };
        assert!(matches!(low.to_function(), Err(SearchError::InvalidWeight(_))));
        let ok = WeightConfig { max_interchanges: Some(1), ..WeightConfig::new(WeightKind::MaxInterchanges) };
        assert_eq!(ok.to_function().unwrap(), WeightFunction::MaxInterchanges { max: 1 });
        assert_eq!(WeightConfig::default().to_function().unwrap(), WeightFunction::TravelTimeModes);
    }
}

#[cfg(test)]
mod comparator_properties {
    use std::cmp::Ordering;

    use proptest::prelude::*;

    use crate::{LabelCost, WeightFunction};

    const FUNCTIONS: [WeightFunction; 4] = [
        WeightFunction::TravelTimeModes,
        WeightFunction::PriceTravelTime,
        WeightFunction::InterchangePenalty { factor: 1.5 },
        WeightFunction::MaxInterchanges { max: 1 },
    ];

    fn cost_strategy() -> impl Strategy<Value = LabelCost> {
        // Small ranges so ties actually occur.
        (0u32..20, 0u32..10, 0u32..5, 0u32..4, 0u32..4).prop_map(|(tt, d, p, ic, rm)| LabelCost {
            travel_time:     f64::from(tt) * 10.0,
            distance:        f64::from(d) * 10.0,
            price:           f64::from(p) * 0.5,
            interchanges:    ic,
            remaining_modes: rm,
        })
    }

    proptest! {
        #[test]
        fn reflexive_and_antisymmetric(a in cost_strategy(), b in cost_strategy()) {
            for w in FUNCTIONS {
                prop_assert_eq!(w.compare(&a, &a), Ordering::Equal);
                prop_assert_eq!(w.compare(&a, &b), w.compare(&b, &a).reverse());
            }
        }

        #[test]
        fn transitive(a in cost_strategy(), b in cost_strategy(), c in cost_strategy()) {
            for w in FUNCTIONS {
                if w.compare(&a, &b) != Ordering::Greater && w.compare(&b, &c) != Ordering::Greater {
                    prop_assert_ne!(w.compare(&a, &c), Ordering::Greater, "{:?}", w);
                }
                if w.compare(&a, &b) == Ordering::Less && w.compare(&b, &c) == Ordering::Less {
                    prop_assert_eq!(w.compare(&a, &c), Ordering::Less, "{:?}", w);
                }
            }
        }
    }
}

// ── Destination store ─────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use acc_core::ObjectId;

    use crate::{Candidate, LabelCost, LabelId, Measures, SearchBounds, SingleStore, WeightFunction};

    fn cand(dest: u64, tt: f64, value: f64) -> Candidate {
        let cost = LabelCost { travel_time: tt, distance: tt, ..LabelCost::default() };
        Candidate {
            destination: ObjectId(dest),
            value,
            label:       LabelId(0),
            distance:    tt,
            travel_time: tt,
            measures:    Measures::default(),
            key:         WeightFunction::TravelTimeModes.key(&cost),
        }
    }

    #[test]
    fn keeps_best_per_destination() {
        let mut s = SingleStore::new(SearchBounds::unbounded());
        assert!(s.add_result(cand(1, 100.0, 2.0)));
        assert!(!s.add_result(cand(1, 150.0, 2.0)));
        assert!(s.add_result(cand(1, 80.0, 2.0)));
        assert_eq!(s.len(), 1);
        assert_eq!(s.value_sum(), 2.0);
        assert_eq!(s.selected()[0].travel_time, 80.0);
    }

    #[test]
    fn finished_conditions() {
        let mut shortest = SingleStore::new(SearchBounds::unbounded().with_shortest_only(true));
        assert!(!shortest.finished());
        shortest.add_result(cand(1, 10.0, 1.0));
        assert!(shortest.finished());

        let mut count = SingleStore::new(SearchBounds::unbounded().with_max_destinations(2));
        count.add_result(cand(1, 10.0, 1.0));
        assert!(!count.finished());
        count.add_result(cand(2, 20.0, 1.0));
        assert!(count.finished());

        let mut value = SingleStore::new(SearchBounds::unbounded().with_max_value(3.0));
        value.add_result(cand(1, 10.0, 2.0));
        assert!(!value.finished());
        value.add_result(cand(2, 20.0, 1.0));
        assert!(value.finished());

        let mut none = SingleStore::new(SearchBounds::unbounded());
        none.add_result(cand(1, 10.0, 100.0));
        assert!(!none.finished());
    }

    #[test]
    fn capped_candidates_do_not_finish() {
        let mut s = SingleStore::new(
            SearchBounds::unbounded()
                .with_max_destinations(1)
                .with_max_travel_time(100.0),
        );
        s.add_result(cand(1, 400.0, 1.0));
        assert!(!s.finished());
        assert_eq!(s.value_sum(), 0.0);
        s.add_result(cand(2, 50.0, 1.0));
        assert!(s.finished());

        // A better path brings a capped destination under the limit.
        let mut t = SingleStore::new(
            SearchBounds::unbounded()
                .with_max_destinations(1)
                .with_max_travel_time(100.0),
        );
        t.add_result(cand(1, 400.0, 1.0));
        t.add_result(cand(1, 90.0, 1.0));
        assert!(t.finished());
        assert_eq!(t.value_sum(), 1.0);
    }

    #[test]
    fn selection_order_and_truncation() {
        let mut s = SingleStore::new(
            SearchBounds::unbounded()
                .with_max_travel_time(300.0)
                .with_max_value(2.5),
        );
        s.add_result(cand(4, 400.0, 1.0)); // over the hard cap
        s.add_result(cand(3, 250.0, 1.0));
        s.add_result(cand(2, 200.0, 2.0));
        s.add_result(cand(1, 200.0, 1.0));
        let ids: Vec<u64> = s.selected().iter().map(|c| c.destination.0).collect();
        // Key order: 1, 2 (tie on time, id breaks it); value 1 + 2 reaches 2.5.
        assert_eq!(ids, vec![1, 2]);
    }
}

// ── Single-mode search ────────────────────────────────────────────────────────

#[cfg(test)]
mod single_mode {
    use acc_core::{Coord, EdgeId, ObjectId};
    use acc_network::{NetworkBuilder, SpeedInterval};

    use crate::{SearchBounds, SearchEngine, SearchSettings};

    use super::helpers::{at, close, layer, line, modes, set};

    #[test]
    fn line_graph_reaches_far_end() {
        let reg = modes();
        let (net, fwd) = line(3, 100.0);
        let dests = layer(&net, vec![at(9, fwd[2], 100.0)]);
        let mut engine = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot"]))).unwrap();
        assert!(!engine.is_intermodal());

        let out = engine.search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.destination, ObjectId(9));
        assert!(close(r.distance, 300.0));
        assert!(close(r.travel_time, 300.0));
        assert_eq!(r.path, fwd);
        assert!(out.stats.nodes_settled > 0);
    }

    #[test]
    fn max_destinations_keeps_nearest() {
        let reg = modes();
        let (net, fwd) = line(3, 100.0);
        let dests = layer(&net, vec![at(2, fwd[2], 50.0), at(1, fwd[1], 50.0)]);
        let settings = SearchSettings::new(set(&reg, &["foot"]))
            .with_bounds(SearchBounds::unbounded().with_max_destinations(1));
        let mut engine = SearchEngine::new(&net, &reg, settings).unwrap();

        let out = engine.search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].destination, ObjectId(1));
        assert!(close(out.records[0].distance, 150.0));
        assert!(out.stats.bound_extended);
    }

    #[test]
    fn shortest_only_returns_one() {
        let reg = modes();
        let (net, fwd) = line(3, 100.0);
        let dests = layer(&net, vec![at(1, fwd[1], 50.0), at(2, fwd[2], 50.0)]);
        let settings = SearchSettings::new(set(&reg, &["foot"]))
            .with_bounds(SearchBounds::unbounded().with_shortest_only(true));
        let mut engine = SearchEngine::new(&net, &reg, settings).unwrap();

        let out = engine.search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].destination, ObjectId(1));
    }

    /// O —10 m— X —1000 m— Y, and X —100 m— Z —100 m— W.
    /// Object 1 sits at Y, object 2 halfway along Z→W.
    fn branching() -> (acc_network::Network, acc_network::ObjectLayer, EdgeId) {
        let foot = set(&modes(), &["foot"]);
        let mut b = NetworkBuilder::new();
        let o = b.add_node(Coord::new(0.0, 0.0));
        let x = b.add_node(Coord::new(10.0, 0.0));
        let y = b.add_node(Coord::new(1_010.0, 0.0));
        let z = b.add_node(Coord::new(10.0, 100.0));
        let w = b.add_node(Coord::new(10.0, 200.0));
        let (ox, _) = b.add_road(o, x, 10.0, 1.0, foot);
        let (xy, _) = b.add_road(x, y, 1_000.0, 1.0, foot);
        b.add_road(x, z, 100.0, 1.0, foot);
        let (zw, _) = b.add_road(z, w, 100.0, 1.0, foot);
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, xy, 1_000.0), at(2, zw, 50.0)]);
        (net, dests, ox)
    }

    #[test]
    fn far_branch_does_not_end_search_early() {
        let reg = modes();
        let (net, dests, ox) = branching();
        for bounds in [
            SearchBounds::unbounded().with_max_destinations(1),
            SearchBounds::unbounded().with_max_destinations(1).with_max_travel_time(500.0),
            SearchBounds::unbounded().with_shortest_only(true),
        ] {
            let settings = SearchSettings::new(set(&reg, &["foot"])).with_bounds(bounds);
            let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, ox, 0.0), &dests);
            assert_eq!(out.records.len(), 1, "{bounds:?}");
            assert_eq!(out.records[0].destination, ObjectId(2), "{bounds:?}");
            assert!(close(out.records[0].travel_time, 160.0));
            assert!(out.stats.bound_extended, "{bounds:?}");
        }
    }

    #[test]
    fn hard_caps_hold_after_extension() {
        let reg = modes();
        let (net, fwd) = line(10, 100.0);
        let objs = fwd.iter().enumerate().map(|(i, &e)| at(i as u64 + 1, e, 50.0)).collect();
        let dests = layer(&net, objs);

        let by_time = SearchSettings::new(set(&reg, &["foot"]))
            .with_bounds(SearchBounds::unbounded().with_max_travel_time(420.0));
        let out = SearchEngine::new(&net, &reg, by_time).unwrap().search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 4);
        assert!(out.records.iter().all(|r| r.travel_time <= 420.0));

        let by_dist = SearchSettings::new(set(&reg, &["foot"]))
            .with_bounds(SearchBounds::unbounded().with_max_distance(300.0));
        let out = SearchEngine::new(&net, &reg, by_dist).unwrap().search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 3);
        assert!(out.records.iter().all(|r| r.distance <= 300.0));
    }

    #[test]
    fn max_value_includes_the_crossing_entry() {
        let reg = modes();
        let (net, fwd) = line(3, 100.0);
        let mut objs = vec![at(1, fwd[0], 50.0), at(2, fwd[1], 50.0), at(3, fwd[2], 50.0)];
        for (o, v) in objs.iter_mut().zip([1.0, 2.0, 3.0]) {
            o.weight = v;
        }
        let dests = layer(&net, objs);
        let settings = SearchSettings::new(set(&reg, &["foot"]))
            .with_bounds(SearchBounds::unbounded().with_max_value(2.5));
        let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, fwd[0], 0.0), &dests);
        let ids: Vec<u64> = out.records.iter().map(|r| r.destination.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn results_sorted_by_time_then_id() {
        let reg = modes();
        let (net, fwd) = line(2, 100.0);
        let dests = layer(&net, vec![at(7, fwd[1], 50.0), at(5, fwd[1], 50.0), at(6, fwd[0], 20.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot"])))
            .unwrap()
            .search(&at(0, fwd[0], 0.0), &dests);
        let ids: Vec<u64> = out.records.iter().map(|r| r.destination.0).collect();
        assert_eq!(ids, vec![6, 5, 7]);
    }

    #[test]
    fn zero_length_cycle_terminates() {
        let reg = modes();
        let foot = set(&reg, &["foot"]);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let c = b.add_node(Coord::new(0.0, 0.0));
        let d = b.add_node(Coord::new(0.0, 0.0));
        let (ac, _) = b.add_road(a, c, 0.0, 1.0, foot);
        b.add_road(c, d, 0.0, 1.0, foot);
        let (da, _) = b.add_road(d, a, 0.0, 1.0, foot);
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, da, 0.0)]);

        let out = SearchEngine::new(&net, &reg, SearchSettings::new(foot))
            .unwrap()
            .search(&at(0, ac, 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].travel_time, 0.0);
        assert_eq!(out.records[0].distance, 0.0);
    }

    #[test]
    fn origin_mid_edge_is_trimmed() {
        let reg = modes();
        let (net, fwd) = line(1, 100.0);
        let dests = layer(&net, vec![at(1, fwd[0], 80.0), at(2, fwd[0], 10.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot"])))
            .unwrap()
            .search(&at(0, fwd[0], 30.0), &dests);
        assert_eq!(out.records.len(), 2);
        // Behind the origin: reached backwards along the opposite edge.
        let behind = out.records.iter().find(|r| r.destination == ObjectId(2)).unwrap();
        assert!(close(behind.distance, 20.0));
        assert!(close(behind.travel_time, 20.0));
        assert_eq!(behind.path, vec![net.edge(fwd[0]).opposite.unwrap()]);
        let ahead = out.records.iter().find(|r| r.destination == ObjectId(1)).unwrap();
        assert!(close(ahead.distance, 50.0));
        assert!(close(ahead.travel_time, 50.0));
    }

    #[test]
    fn behind_origin_on_one_way_edge_is_unreachable() {
        let reg = modes();
        let foot = set(&reg, &["foot"]);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let c = b.add_node(Coord::new(100.0, 0.0));
        let e = b.add_edge(a, c, 100.0, 1.0, foot);
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, e, 10.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(foot))
            .unwrap()
            .search(&at(0, e, 30.0), &dests);
        assert!(out.records.is_empty());
    }

    #[test]
    fn crossing_time_is_added() {
        let reg = modes();
        let foot = set(&reg, &["foot"]);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let c = b.add_node(Coord::new(100.0, 0.0));
        let d = b.add_node(Coord::new(200.0, 0.0));
        let (ac, _) = b.add_road(a, c, 100.0, 1.0, foot);
        let (cd, _) = b.add_road(c, d, 100.0, 1.0, foot);
        b.set_crossing_time(ac, cd, 30.0).unwrap();
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, cd, 100.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(foot))
            .unwrap()
            .search(&at(0, ac, 0.0), &dests);
        assert!(close(out.records[0].travel_time, 230.0));
        assert!(close(out.records[0].distance, 200.0));
    }

    #[test]
    fn speed_depends_on_start_time() {
        let reg = modes();
        let foot = set(&reg, &["foot"]);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let c = b.add_node(Coord::new(100.0, 0.0));
        let (ac, _) = b.add_road(a, c, 100.0, 1.0, foot);
        b.set_speed_profile(ac, vec![SpeedInterval { start: 1_000.0, end: 2_000.0, speed: 0.5 }]).unwrap();
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, ac, 100.0)]);

        for (start, expected) in [(0.0, 100.0), (1_500.0, 200.0)] {
            let settings = SearchSettings::new(foot).with_start_time(start);
            let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, ac, 0.0), &dests);
            assert!(close(out.records[0].travel_time, expected), "start {start}");
        }
    }

    #[test]
    fn origin_on_unknown_edge_finds_nothing() {
        let reg = modes();
        let (net, fwd) = line(1, 100.0);
        let dests = layer(&net, vec![at(1, fwd[0], 10.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot"])))
            .unwrap()
            .search(&at(0, EdgeId(99), 0.0), &dests);
        assert!(out.records.is_empty());
    }

    #[test]
    fn repeated_searches_are_identical() {
        let reg = modes();
        let (net, fwd) = line(4, 100.0);
        let objs = fwd.iter().enumerate().map(|(i, &e)| at(i as u64 + 1, e, 60.0)).collect();
        let dests = layer(&net, objs);
        let mut engine = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot"]))).unwrap();
        let first  = engine.search(&at(0, fwd[1], 10.0), &dests);
        let second = engine.search(&at(0, fwd[1], 10.0), &dests);
        assert_eq!(first.records, second.records);
        assert_eq!(first.records.len(), 4);
    }
}

// ── Intermodal search ─────────────────────────────────────────────────────────

#[cfg(test)]
mod intermodal {
    use acc_core::{Coord, EdgeId, LineId, ModeSet, TripId};
    use acc_network::{Connection, Network, NetworkBuilder, Timetable};

    use crate::{SearchEngine, SearchError, SearchSettings, WeightFunction};

    use super::helpers::{at, close, layer, modes, set};

    fn conn(trip: u32, line: u32, dep: f64, arr: f64) -> Connection {
        Connection { trip: TripId(trip), line: LineId(line), departure: dep, arrival: arr }
    }

    /// O —150 m foot— S ══transit══► T —100 m foot— U
    ///
    /// Returns the network, the O→S edge and the T→U edge.
    fn one_ride(connections: Vec<Connection>) -> (Network, EdgeId, EdgeId) {
        let reg = modes();
        let foot    = set(&reg, &["foot"]);
        let transit = set(&reg, &["transit"]);
        let mut b = NetworkBuilder::new();
        let o = b.add_node(Coord::new(0.0, 0.0));
        let s = b.add_node(Coord::new(150.0, 0.0));
        let t = b.add_node(Coord::new(1_150.0, 0.0));
        let u = b.add_node(Coord::new(1_250.0, 0.0));
        let (os, _) = b.add_road(o, s, 150.0, 1.0, foot);
        b.add_transit_edge(s, t, 1_000.0, transit, Timetable::new(connections));
        let (tu, _) = b.add_road(t, u, 100.0, 1.0, foot);
        (b.build().unwrap(), os, tu)
    }

    /// O —150 m— S ══► T ══► V —100 m— W, transfer 1→2 at T takes 30 s.
    fn two_rides(second: Vec<Connection>) -> (Network, EdgeId, EdgeId) {
        let reg = modes();
        let foot    = set(&reg, &["foot"]);
        let transit = set(&reg, &["transit"]);
        let mut b = NetworkBuilder::new();
        let o = b.add_node(Coord::new(0.0, 0.0));
        let s = b.add_node(Coord::new(150.0, 0.0));
        let t = b.add_node(Coord::new(1_150.0, 0.0));
        let v = b.add_node(Coord::new(2_150.0, 0.0));
        let w = b.add_node(Coord::new(2_250.0, 0.0));
        let (os, _) = b.add_road(o, s, 150.0, 1.0, foot);
        b.add_transit_edge(s, t, 1_000.0, transit, Timetable::new(vec![conn(1, 1, 200.0, 260.0)]));
        b.add_transit_edge(t, v, 1_000.0, transit, Timetable::new(second));
        b.set_interchange_time(t, LineId(1), LineId(2), 30.0).unwrap();
        let (vw, _) = b.add_road(v, w, 100.0, 1.0, foot);
        (b.build().unwrap(), os, vw)
    }

    #[test]
    fn boards_first_departure_after_arrival() {
        let reg = modes();
        let (net, os, tu) = one_ride(vec![conn(1, 1, 100.0, 160.0), conn(2, 2, 200.0, 260.0)]);
        let dests = layer(&net, vec![at(1, tu, 0.0)]);
        let mut engine =
            SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot", "transit"]))).unwrap();
        assert!(engine.is_intermodal());

        let out = engine.search(&at(0, os, 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.lines, vec![LineId(2)]);
        assert!(close(r.travel_time, 260.0));
        assert!(close(r.distance, 1_150.0));
        assert!(close(r.measures.waiting_time, 50.0));
        assert!(close(r.measures.transit_time, 60.0));
        assert_eq!(r.measures.interchanges, 0);
        assert!(r.modes.contains(reg.by_name("transit").unwrap().id));
    }

    #[test]
    fn end_of_service_leaves_destination_unreached() {
        let reg = modes();
        let (net, os, tu) = one_ride(vec![conn(1, 1, 100.0, 160.0), conn(2, 2, 200.0, 260.0)]);
        let dests = layer(&net, vec![at(1, tu, 0.0)]);
        let settings = SearchSettings::new(set(&reg, &["foot", "transit"])).with_start_time(300.0);
        let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, os, 0.0), &dests);
        assert!(out.records.is_empty());
    }

    #[test]
    fn staying_aboard_is_not_an_interchange() {
        let reg = modes();
        let (net, os, vw) = two_rides(vec![conn(1, 1, 265.0, 300.0), conn(3, 2, 400.0, 460.0)]);
        let dests = layer(&net, vec![at(1, vw, 0.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot", "transit"])))
            .unwrap()
            .search(&at(0, os, 0.0), &dests);
        let r = &out.records[0];
        assert!(close(r.travel_time, 300.0));
        assert_eq!(r.measures.interchanges, 0);
        assert_eq!(r.lines, vec![LineId(1)]);
    }

    #[test]
    fn same_line_trip_change_is_not_an_interchange() {
        let reg = modes();
        let (net, os, vw) = two_rides(vec![conn(2, 1, 400.0, 460.0)]);
        let dests = layer(&net, vec![at(1, vw, 0.0)]);
        let out = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot", "transit"])))
            .unwrap()
            .search(&at(0, os, 0.0), &dests);
        let r = &out.records[0];
        assert!(close(r.travel_time, 460.0));
        assert_eq!(r.measures.interchanges, 0);
        assert_eq!(r.lines, vec![LineId(1)]);
    }

    #[test]
    fn interchange_time_delays_boarding() {
        let reg = modes();
        // Trip 2 leaves 10 s after arrival: too soon for the 30 s transfer.
        let (net, os, vw) = two_rides(vec![conn(2, 2, 270.0, 330.0), conn(3, 2, 400.0, 460.0)]);
        let dests = layer(&net, vec![at(1, vw, 0.0)]);
        let settings = SearchSettings::new(set(&reg, &["foot", "transit"])).with_default_interchange(600.0);
        let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, os, 0.0), &dests);
        let r = &out.records[0];
        assert!(close(r.travel_time, 460.0));
        assert_eq!(r.measures.interchanges, 1);
        assert!(close(r.measures.interchange_time, 30.0));
        assert!(close(r.measures.waiting_time, 50.0 + 110.0));
        assert_eq!(r.lines, vec![LineId(1), LineId(2)]);
    }

    #[test]
    fn weight_function_picks_mode() {
        let reg = modes();
        let both = set(&reg, &["foot", "car"]);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let c = b.add_node(Coord::new(100.0, 0.0));
        let (ac, _) = b.add_road(a, c, 100.0, 10.0, both);
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, ac, 100.0)]);
        let foot = reg.by_name("foot").unwrap().id;
        let car  = reg.by_name("car").unwrap().id;

        let fast = SearchEngine::new(&net, &reg, SearchSettings::new(both))
            .unwrap()
            .search(&at(0, ac, 0.0), &dests);
        assert_eq!(fast.records[0].modes, ModeSet::single(car));
        assert!(close(fast.records[0].travel_time, 10.0));

        let cheap = SearchSettings::new(both).with_weight(WeightFunction::PriceTravelTime);
        let out = SearchEngine::new(&net, &reg, cheap).unwrap().search(&at(0, ac, 0.0), &dests);
        assert_eq!(out.records[0].modes, ModeSet::single(foot));
        assert_eq!(out.records[0].measures.price, 0.0);
    }

    #[test]
    fn labels_respect_edge_modes_and_switch_rules() {
        let reg = modes();
        let foot = reg.by_name("foot").unwrap().id;
        let car  = reg.by_name("car").unwrap().id;
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let p = b.add_node(Coord::new(100.0, 0.0));
        let q = b.add_node(Coord::new(200.0, 0.0));
        let r = b.add_node(Coord::new(300.0, 0.0));
        let (ap, _) = b.add_road(a, p, 100.0, 10.0, ModeSet::single(car));
        b.add_road(p, q, 100.0, 10.0, ModeSet::single(car).with(foot));
        let (qr, _) = b.add_road(q, r, 100.0, 10.0, ModeSet::single(foot));
        b.add_mode_switch(p, car, foot).unwrap();
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, qr, 100.0)]);

        let mut engine = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["car", "foot"]))).unwrap();
        let out = engine.search(&at(0, ap, 0.0), &dests);
        assert_eq!(out.records.len(), 1);

        let arena = engine.arena();
        let mut switches = 0;
        for (_, label) in arena.iter() {
            assert!(label.modes.contains(label.mode), "{label:?}");
            if !label.switched {
                assert!(net.edge(label.edge).modes.contains(label.mode), "{label:?}");
            } else {
                switches += 1;
                let prev = arena.get(label.prev.unwrap());
                assert!(net.node(label.node).switches_from(prev.mode).any(|m| m == label.mode));
                assert!(!label.modes.contains(prev.mode));
            }
        }
        assert!(switches >= 1);
        assert!(arena.iter().filter(|(_, l)| l.switched).all(|(_, l)| l.node == p));
    }

    #[test]
    fn switches_only_to_requested_modes() {
        let reg = modes();
        let foot = reg.by_name("foot").unwrap().id;
        let car  = reg.by_name("car").unwrap().id;
        let both = ModeSet::single(foot).with(car);
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Coord::new(0.0, 0.0));
        let p = b.add_node(Coord::new(100.0, 0.0));
        let q = b.add_node(Coord::new(200.0, 0.0));
        let (ap, _) = b.add_road(a, p, 100.0, 10.0, both);
        let (pq, _) = b.add_road(p, q, 100.0, 10.0, both);
        b.add_mode_switch(p, foot, car).unwrap();
        let net = b.build().unwrap();
        let dests = layer(&net, vec![at(1, pq, 100.0)]);

        let mut engine =
            SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["foot", "transit"]))).unwrap();
        assert!(engine.is_intermodal());
        let out = engine.search(&at(0, ap, 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].modes, ModeSet::single(foot));
        assert!(engine.arena().iter().all(|(_, l)| l.mode != car));
    }

    #[test]
    fn scheduled_only_mode_set_is_rejected() {
        let reg = modes();
        let (net, _, _) = one_ride(vec![]);
        let err = SearchEngine::new(&net, &reg, SearchSettings::new(set(&reg, &["transit"])));
        assert!(matches!(err, Err(SearchError::NoStartMode(_))));

        let bad = SearchSettings::new(set(&reg, &["foot"]))
            .with_weight(WeightFunction::InterchangePenalty { factor: f64::NAN });
        assert!(matches!(SearchEngine::new(&net, &reg, bad), Err(SearchError::InvalidWeight(_))));

        let unknown = SearchSettings::new(ModeSet::single(acc_core::ModeId(40)));
        assert!(matches!(
            SearchEngine::new(&net, &reg, unknown),
            Err(SearchError::UnregisteredMode(40))
        ));
    }
}

// ── Multi-category ────────────────────────────────────────────────────────────

#[cfg(test)]
mod categories {
    use std::sync::Arc;

    use acc_core::{CategoryId, ObjectId};

    use crate::{DestinationCategories, SearchBounds, SearchEngine, SearchError, SearchSettings};

    use super::helpers::{at, layer, line, modes, set};

    #[test]
    fn categories_are_bounded_independently() {
        let reg = modes();
        let (net, fwd) = line(3, 100.0);
        let dests = layer(&net, vec![at(1, fwd[1], 50.0), at(2, fwd[2], 50.0)]);

        let (shops, parks) = (CategoryId(1), CategoryId(2));
        let mut plan = DestinationCategories::new();
        plan.add_category(shops, SearchBounds::unbounded().with_max_destinations(2)).unwrap();
        plan.add_category(parks, SearchBounds::unbounded().with_max_travel_time(200.0)).unwrap();
        for d in [1, 2] {
            plan.assign(ObjectId(d), shops).unwrap();
            plan.assign(ObjectId(d), parks).unwrap();
        }

        let settings = SearchSettings::new(set(&reg, &["foot"])).with_categories(Arc::new(plan));
        let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, fwd[0], 0.0), &dests);

        let of = |cat: CategoryId| -> Vec<u64> {
            out.records
                .iter()
                .filter(|r| r.category == Some(cat))
                .map(|r| r.destination.0)
                .collect()
        };
        assert_eq!(of(shops), vec![1, 2]);
        assert_eq!(of(parks), vec![1]);
    }

    #[test]
    fn uncategorised_destinations_are_ignored() {
        let reg = modes();
        let (net, fwd) = line(2, 100.0);
        let dests = layer(&net, vec![at(1, fwd[0], 50.0), at(2, fwd[1], 50.0)]);
        let mut plan = DestinationCategories::new();
        plan.add_category(CategoryId(1), SearchBounds::unbounded()).unwrap();
        plan.assign(ObjectId(2), CategoryId(1)).unwrap();

        let settings = SearchSettings::new(set(&reg, &["foot"])).with_categories(Arc::new(plan));
        let out = SearchEngine::new(&net, &reg, settings).unwrap().search(&at(0, fwd[0], 0.0), &dests);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].destination, ObjectId(2));
    }

    #[test]
    fn plan_validation() {
        let mut plan = DestinationCategories::new();
        plan.add_category(CategoryId(3), SearchBounds::unbounded()).unwrap();
        assert_eq!(
            plan.add_category(CategoryId(3), SearchBounds::unbounded()),
            Err(SearchError::DuplicateCategory(CategoryId(3)))
        );
        assert_eq!(
            plan.assign(ObjectId(1), CategoryId(4)),
            Err(SearchError::UnknownCategory(CategoryId(4)))
        );
        plan.assign(ObjectId(1), CategoryId(3)).unwrap();
        plan.assign(ObjectId(1), CategoryId(3)).unwrap();
        assert_eq!(plan.categories_of(ObjectId(1)), &[CategoryId(3)]);
        assert!(plan.categories_of(ObjectId(2)).is_empty());
    }
}
