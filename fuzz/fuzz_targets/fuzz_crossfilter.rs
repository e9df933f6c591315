#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sales_dashboard::crossfilter::{derive, filter_view};
use sales_dashboard::dashboard::Dashboard;
use sales_dashboard::filter::FilterState;
use sales_dashboard::model::{Dataset, Dimension, FactRow};

#[derive(Debug, Arbitrary)]
struct CrossFilterInput {
    rows: Vec<FactRow>,
    /// (dimension, option index) pairs to add to the selection.
    picks: Vec<(Dimension, u8)>,
}

fuzz_target!(|input: CrossFilterInput| {
    let ds = Dataset::new(input.rows);
    let mut state = FilterState::new(&ds);
    for (dimension, idx) in input.picks {
        let options = state.options(dimension);
        if options.is_empty() {
            continue;
        }
        let value = options[usize::from(idx) % options.len()].clone();
        let mut values: Vec<_> = state.selected(dimension).iter().cloned().collect();
        values.push(value);
        state
            .select(dimension, values)
            .expect("options are always selectable");
    }

    let views = derive(&ds, &state);
    assert!(views.main.len() <= views.by_country.len());
    assert!(views.main.len() <= views.by_gender.len());
    assert!(views.main.len() <= views.by_category.len());
    for d in Dimension::ALL {
        let mut cleared = state.clone();
        cleared.clear(d);
        assert_eq!(
            filter_view(&ds, &cleared, Some(d)).indices(),
            filter_view(&ds, &state, Some(d)).indices()
        );
    }

    // Rendering must not panic on any data, NaN amounts included.
    let _ = Dashboard::new(ds).frame();
});
