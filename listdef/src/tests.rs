use crate::*;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

struct CellView;
struct OtherCellView;
struct HeaderView;

#[derive(Clone, Debug, Default)]
struct FakeView {
    id: u64,
    text: Option<String>,
    selection: Option<SelectionStyle>,
}

impl ViewHandle for FakeView {
    fn view_id(&self) -> ViewId {
        ViewId(self.id)
    }
}

impl LabelView for FakeView {
    fn set_text(&mut self, text: Option<&str>) {
        self.text = text.map(ToString::to_string);
    }
}

#[derive(Default)]
struct FakeHost {
    rows: Vec<(ReuseIdentifier, ViewType)>,
    headers: Vec<(ReuseIdentifier, ViewType)>,
    pool: Vec<FakeView>,
    visible: BTreeMap<IndexPath, FakeView>,
    next_id: u64,
    styled: usize,
}

impl FakeHost {
    fn new_view(&mut self) -> FakeView {
        let view = FakeView {
            id: self.next_id,
            ..FakeView::default()
        };
        self.next_id += 1;
        view
    }

    fn recycle(&mut self, view: FakeView) {
        self.pool.push(view);
    }

    fn registered_row_identifiers(&self) -> Vec<&str> {
        self.rows.iter().map(|(id, _)| id.as_str()).collect()
    }
}

impl HostSurface for FakeHost {
    type View = FakeView;

    fn register_row_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType) {
        self.rows.push((identifier.clone(), view_type));
    }

    fn register_header_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType) {
        self.headers.push((identifier.clone(), view_type));
    }

    fn dequeue_row_view(&mut self, identifier: &ReuseIdentifier, _index_path: IndexPath) -> FakeView {
        assert!(
            self.rows.iter().any(|(id, _)| id == identifier),
            "dequeue of unregistered identifier {identifier}"
        );
        match self.pool.pop() {
            Some(view) => view,
            None => self.new_view(),
        }
    }

    fn dequeue_header_view(&mut self, identifier: &ReuseIdentifier) -> Option<FakeView> {
        if self.headers.iter().any(|(id, _)| id == identifier) {
            Some(self.new_view())
        } else {
            None
        }
    }

    fn visible_row_view(&mut self, index_path: IndexPath) -> Option<FakeView> {
        self.visible.get(&index_path).cloned()
    }

    fn apply_selection_style(&mut self, view: &mut FakeView, style: SelectionStyle) {
        view.selection = Some(style);
        self.styled += 1;
    }
}

fn plain(title: &str) -> Row<FakeView> {
    Row::plain::<CellView>(title)
}

fn section(titles: &[&str]) -> Section<FakeView> {
    Section::new().with_rows(titles.iter().map(|t| plain(t)))
}

fn titles(tree: &DefinitionTree<FakeView>, section: usize) -> Vec<String> {
    let Some(key) = tree.section_key(section) else {
        return Vec::new();
    };
    tree.rows_in(key)
        .map(|(_, row)| {
            let content: &dyn RowContent<FakeView> = row.content();
            content.height_signature().unwrap_or_default()
        })
        .collect()
}

fn assert_positions_consistent(tree: &DefinitionTree<FakeView>) {
    for (s, (section_key, section)) in tree.sections().enumerate() {
        assert_eq!(section.position(), Some(s));
        for (r, (row_key, row)) in tree.rows_in(section_key).enumerate() {
            assert_eq!(row.position(), Some(r));
            assert_eq!(row.section(), Some(section_key));
            assert_eq!(tree.index_path(row_key), Some(IndexPath::new(s, r)));
            assert_eq!(tree.row_key(IndexPath::new(s, r)), Some(row_key));
        }
    }
}

fn attached(tree: DefinitionTree<FakeView>) -> (DataSource<FakeView>, FakeHost) {
    let mut host = FakeHost::default();
    let mut ds = DataSource::new(DataSourceOptions::new());
    ds.attach(&mut host);
    ds.set_tree(&mut host, tree);
    (ds, host)
}

#[derive(Default)]
struct RecorderLog {
    prefetched: Cell<usize>,
    cancelled: Cell<usize>,
    configured: Cell<usize>,
}

struct Recorder(Rc<RecorderLog>);

impl RowContent<FakeView> for Recorder {
    fn view_type(&self) -> ViewType {
        ViewType::of::<OtherCellView>()
    }

    fn configure(&mut self, _cx: &mut RowContext<'_, FakeView>) {
        self.0.configured.set(self.0.configured.get() + 1);
    }

    fn prefetch(&mut self, _index_path: IndexPath) {
        self.0.prefetched.set(self.0.prefetched.get() + 1);
    }

    fn cancel_prefetch(&mut self, _index_path: IndexPath) {
        self.0.cancelled.set(self.0.cancelled.get() + 1);
    }
}

#[test]
fn appended_section_rows_get_index_paths() {
    let mut tree = DefinitionTree::from_sections([
        section(&["a"]),
        section(&["b"]),
        section(&["c"]),
    ]);
    let key = tree.append_section(Section::new());
    let row = tree.append_row(key, plain("d")).unwrap();

    assert_eq!(tree.section_count(), 4);
    assert_eq!(tree.section(key).unwrap().position(), Some(3));
    assert_eq!(tree.index_path(row), Some(IndexPath::new(3, 0)));
    assert_eq!(tree.row(row).unwrap().index_path(&tree), IndexPath::new(3, 0));
    assert_positions_consistent(&tree);
}

#[test]
fn insert_row_renumbers_following_rows() {
    let mut tree = DefinitionTree::from_sections([section(&["a", "b", "c"])]);
    let key = tree.section_key(0).unwrap();
    let a = tree.row_key(IndexPath::new(0, 0)).unwrap();
    let x = tree.insert_row(key, plain("x"), 1).unwrap();

    assert_eq!(tree.row(a).unwrap().position(), Some(0));
    assert_eq!(tree.row(x).unwrap().position(), Some(1));
    assert_eq!(tree.row_count(0), 4);
    assert_positions_consistent(&tree);
}

#[test]
fn insert_positions_are_clamped() {
    let mut tree = DefinitionTree::from_sections([section(&["a"])]);
    let key = tree.section_key(0).unwrap();
    let row = tree.insert_row(key, plain("z"), 99).unwrap();
    assert_eq!(tree.row(row).unwrap().position(), Some(1));

    let s = tree.insert_section(Section::new(), 42);
    assert_eq!(tree.section(s).unwrap().position(), Some(1));
    assert_positions_consistent(&tree);
}

#[test]
fn insert_row_into_unknown_section_is_rejected() {
    let mut tree = DefinitionTree::from_sections([section(&["a"])]);
    let key = tree.section_key(0).unwrap();
    assert!(tree.remove_section(key));
    assert_eq!(tree.insert_row(key, plain("x"), 0), None);
    assert_eq!(tree.total_row_count(), 0);
}

#[test]
fn removing_a_missing_row_changes_nothing() {
    let mut tree = DefinitionTree::from_sections([section(&["a", "b"]), section(&["c"])]);
    let first = tree.section_key(0).unwrap();
    let foreign = tree.row_key(IndexPath::new(1, 0)).unwrap();

    assert!(!tree.remove_row(first, foreign));
    assert_eq!(tree.row_count(0), 2);
    assert_eq!(tree.row_count(1), 1);
    assert_positions_consistent(&tree);
}

#[test]
fn removing_rows_and_sections_renumbers_siblings() {
    let mut tree = DefinitionTree::from_sections([
        section(&["a", "b", "c"]),
        section(&["d"]),
        section(&["e", "f"]),
    ]);
    let s0 = tree.section_key(0).unwrap();
    let b = tree.row_key(IndexPath::new(0, 1)).unwrap();
    let c = tree.row_key(IndexPath::new(0, 2)).unwrap();

    assert!(tree.remove_row(s0, b));
    assert!(tree.row(b).is_none());
    assert_eq!(tree.index_path(c), Some(IndexPath::new(0, 1)));

    let s1 = tree.section_key(1).unwrap();
    let d = tree.row_key(IndexPath::new(1, 0)).unwrap();
    let f = tree.row_key(IndexPath::new(2, 1)).unwrap();
    assert!(tree.remove_section(s1));
    assert!(tree.row(d).is_none());
    assert_eq!(tree.index_path(f), Some(IndexPath::new(1, 1)));
    assert_eq!(tree.total_row_count(), 4);
    assert_positions_consistent(&tree);
}

#[test]
fn replace_rows_and_sections() {
    let mut tree = DefinitionTree::from_sections([section(&["a", "b"])]);
    let key = tree.section_key(0).unwrap();
    let old = tree.row_key(IndexPath::new(0, 0)).unwrap();

    let keys = tree.replace_rows(key, [plain("x"), plain("y"), plain("z")]);
    assert_eq!(keys.len(), 3);
    assert!(tree.row(old).is_none());
    assert_positions_consistent(&tree);

    let generation = tree.generation();
    let sections = tree.replace_sections([section(&["p"]), section(&[])]);
    assert_eq!(sections.len(), 2);
    assert_eq!(tree.generation(), generation + 1);
    assert!(tree.section(key).is_none());
    assert_eq!(tree.total_row_count(), 1);
    assert_positions_consistent(&tree);
}

#[test]
fn detached_row_has_no_index_path() {
    let tree: DefinitionTree<FakeView> = DefinitionTree::new();
    let row = plain("loose");
    assert!(!row.is_attached());
    assert_eq!(row.position(), None);
    assert_eq!(row.try_index_path(&tree), None);
}

#[test]
#[should_panic(expected = "no owning section")]
fn detached_row_index_path_panics() {
    let tree: DefinitionTree<FakeView> = DefinitionTree::new();
    let _ = plain("loose").index_path(&tree);
}

#[test]
fn random_mutations_keep_positions_consistent() {
    let mut rng = Lcg::new(0x5eed);
    let mut tree: DefinitionTree<FakeView> = DefinitionTree::new();
    let mut expected: Vec<Vec<usize>> = Vec::new();
    let mut next = 0usize;

    for _ in 0..500 {
        match rng.gen_range_usize(0, 6) {
            0 => {
                let at = rng.gen_range_usize(0, expected.len() + 2);
                tree.insert_section(Section::new(), at);
                expected.insert(at.min(expected.len()), Vec::new());
            }
            1 if !expected.is_empty() => {
                let s = rng.gen_range_usize(0, expected.len());
                assert!(tree.remove_section(tree.section_key(s).unwrap()));
                expected.remove(s);
            }
            2 | 3 if !expected.is_empty() => {
                let s = rng.gen_range_usize(0, expected.len());
                let at = rng.gen_range_usize(0, expected[s].len() + 2);
                let key = tree.section_key(s).unwrap();
                tree.insert_row(key, plain(&next.to_string()), at).unwrap();
                let len = expected[s].len();
                expected[s].insert(at.min(len), next);
                next += 1;
            }
            4 if !expected.is_empty() => {
                let s = rng.gen_range_usize(0, expected.len());
                if expected[s].is_empty() {
                    continue;
                }
                let r = rng.gen_range_usize(0, expected[s].len());
                let key = tree.section_key(s).unwrap();
                let row = tree.row_key(IndexPath::new(s, r)).unwrap();
                let owner = if rng.gen_bool() {
                    key
                } else {
                    tree.section_key((s + 1) % expected.len()).unwrap()
                };
                let removed = tree.remove_row(owner, row);
                assert_eq!(removed, owner == key);
                if removed {
                    expected[s].remove(r);
                }
            }
            _ => {}
        }

        assert_eq!(tree.section_count(), expected.len());
        assert_positions_consistent(&tree);
    }

    let style = TextStyle::default();
    for (s, rows) in expected.iter().enumerate() {
        let want: Vec<String> = rows
            .iter()
            .map(|n| alloc::format!("{}_{}_{}_{}", n, style.font, style.color, style.alignment))
            .collect();
        assert_eq!(titles(&tree, s), want);
    }
}

#[test]
fn height_is_measured_once_per_signature_and_width() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = calls.clone();

    let style = TextStyle::default().with_font(Font::new("Arial", 14.0));
    let row = Row::new(TextRow::new::<CellView>("Hello").with_style(style));
    let content: &dyn RowContent<FakeView> = row.content();
    assert_eq!(
        content.height_signature().as_deref(),
        Some("Hello_Arial-14_#000000FF_left")
    );

    let tree = DefinitionTree::from_sections([Section::new().with_row(row)]);
    let (mut ds, _host) = attached(tree);
    ds.set_layout_width(320.0);
    ds.set_measurer(move |_text: &str, _style: &TextStyle, _width: f32| -> f32 {
        counter.set(counter.get() + 1);
        42.0
    });

    let at = IndexPath::new(0, 0);
    assert_eq!(ds.height_for(at), 42.0);
    assert_eq!(ds.height_for(at), 42.0);
    assert_eq!(calls.get(), 1);
    assert!(ds.heights().contains(&HeightKey::new("Hello_Arial-14_#000000FF_left", 320.0)));
    assert_eq!(
        ds.heights().stats(),
        HeightCacheStats {
            hits: 1,
            misses: 1,
            evictions: 0
        }
    );

    ds.set_layout_width(200.0);
    ds.height_for(at);
    assert_eq!(calls.get(), 2);
}

#[test]
fn identical_content_shares_measurements_across_trees() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = calls.clone();
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([Section::new()
        .with_row(Row::text::<CellView>("same"))
        .with_row(Row::text::<CellView>("same"))]));
    ds.set_layout_width(100.0);
    ds.set_measurer(move |_: &str, _: &TextStyle, _: f32| -> f32 {
        counter.set(counter.get() + 1);
        30.0
    });

    assert_eq!(ds.content_height(), 60.0);
    assert_eq!(calls.get(), 1);

    ds.set_tree(
        &mut host,
        DefinitionTree::from_sections([Section::new().with_row(Row::text::<CellView>("same"))]),
    );
    assert_eq!(ds.height_for(IndexPath::new(0, 0)), 30.0);
    assert_eq!(calls.get(), 1);
}

#[test]
fn clearing_heights_on_replace_forgets_measurements() {
    let mut host = FakeHost::default();
    let mut ds = DataSource::new(
        DataSourceOptions::new()
            .with_layout_width(100.0)
            .with_clear_heights_on_replace(true),
    );
    ds.attach(&mut host);
    ds.set_measurer(|_: &str, _: &TextStyle, _: f32| -> f32 { 12.0 });
    ds.set_tree(
        &mut host,
        DefinitionTree::from_sections([Section::new().with_row(Row::text::<CellView>("t"))]),
    );
    ds.height_for(IndexPath::new(0, 0));
    assert_eq!(ds.heights().len(), 1);

    ds.set_tree(&mut host, DefinitionTree::new());
    assert!(ds.heights().is_empty());
}

#[test]
fn unmeasurable_rows_use_preferred_or_default_height() {
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("fixed").with_preferred_height(60.0))
        .with_row(Row::text::<CellView>("wrap").with_preferred_height(50.0))]);
    let (mut ds, _host) = attached(tree);

    // No measurer and no width yet.
    assert_eq!(ds.height_for(IndexPath::new(0, 0)), 60.0);
    assert_eq!(ds.height_for(IndexPath::new(0, 1)), 50.0);

    ds.set_measurer(|_: &str, _: &TextStyle, _: f32| -> f32 { 20.0 });
    assert_eq!(ds.height_for(IndexPath::new(0, 1)), 50.0);

    ds.set_layout_width(300.0);
    assert_eq!(ds.height_for(IndexPath::new(0, 1)), 20.0);
    assert_eq!(ds.height_for(IndexPath::new(4, 4)), DEFAULT_ROW_HEIGHT);
    assert_eq!(ds.content_height(), 40.0);
}

#[test]
fn insets_are_part_of_the_height_signature() {
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(Row::new(TextRow::new::<CellView>("same")))
        .with_row(Row::new(
            TextRow::new::<CellView>("same").with_insets(VerticalInsets::new(20.0, 20.0)),
        ))]);
    let (mut ds, _host) = attached(tree);
    ds.set_layout_width(100.0);
    ds.set_measurer(|_: &str, _: &TextStyle, _: f32| -> f32 { 30.0 });

    assert_eq!(ds.height_for(IndexPath::new(0, 0)), 30.0);
    assert_eq!(ds.height_for(IndexPath::new(0, 1)), 70.0);
    assert_eq!(ds.heights().len(), 2);

    let padded = ds.row(IndexPath::new(0, 1)).unwrap().content().height_signature();
    assert_eq!(
        padded.as_deref(),
        Some("same_System-17_#000000FF_left_insets:20:20")
    );
}

#[test]
fn nan_layout_width_is_not_measured() {
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(Row::text::<CellView>("wrap").with_preferred_height(50.0))]);
    let (mut ds, _host) = attached(tree);
    ds.set_measurer(|_: &str, _: &TextStyle, _: f32| -> f32 { 20.0 });
    ds.set_layout_width(f32::NAN);

    assert_eq!(ds.height_for(IndexPath::new(0, 0)), 50.0);
    assert!(ds.heights().is_empty());
}

#[test]
fn height_cache_evicts_oldest_first() {
    let mut cache = HeightCache::with_capacity(2);
    cache.insert(HeightKey::new("a", 10.0), 1.0);
    cache.insert(HeightKey::new("b", 10.0), 2.0);
    cache.insert(HeightKey::new("a", 10.0), 3.0);
    cache.insert(HeightKey::new("c", 10.0), 4.0);

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&HeightKey::new("a", 10.0)));
    assert_eq!(cache.get(&HeightKey::new("b", 10.0)), Some(2.0));
    assert_eq!(cache.stats().evictions, 1);

    cache.set_capacity(1);
    assert_eq!(
        cache.export(),
        vec![(HeightKey::new("c", 10.0), 4.0)]
    );
}

#[test]
fn height_cache_export_import_keeps_order() {
    let mut cache = HeightCache::with_capacity(8);
    for (i, sig) in ["x", "y", "z"].iter().enumerate() {
        cache.insert(HeightKey::new(*sig, 1.0), i as f32);
    }
    let snapshot = cache.export();

    let mut restored = HeightCache::with_capacity(2);
    restored.import(snapshot);
    assert_eq!(
        restored.export(),
        vec![(HeightKey::new("y", 1.0), 1.0), (HeightKey::new("z", 1.0), 2.0)]
    );
}

#[test]
fn height_cache_with_zero_capacity_stores_nothing() {
    let mut cache = HeightCache::with_capacity(0);
    let mut measured = 0;
    for _ in 0..3 {
        let h = cache.get_or_measure(HeightKey::new("k", 5.0), || {
            measured += 1;
            Some(9.0)
        });
        assert_eq!(h, Some(9.0));
    }
    assert_eq!(measured, 3);
    assert!(cache.is_empty());
}

#[test]
fn failed_measurement_is_not_cached() {
    let mut cache = HeightCache::default();
    assert_eq!(cache.get_or_measure(HeightKey::new("k", 5.0), || None), None);
    assert!(cache.is_empty());
    assert_eq!(cache.capacity(), DEFAULT_HEIGHT_CACHE_CAPACITY);
}

#[test]
fn height_key_treats_signed_zero_widths_alike() {
    assert_eq!(HeightKey::new("s", 0.0), HeightKey::new("s", -0.0));
    assert_ne!(HeightKey::new("s", 1.0), HeightKey::new("s", 2.0));
}

#[test]
fn registration_happens_once_per_identifier() {
    let tree = DefinitionTree::from_sections([
        section(&["a", "b"]),
        Section::new()
            .with_header_view::<HeaderView>()
            .with_row(Row::new(TextRow::new::<OtherCellView>("t"))),
    ]);
    let (mut ds, mut host) = attached(tree);

    let fallback = ds.options().fallback_identifier.clone();
    let cell = ViewType::of::<CellView>().reuse_identifier();
    let other = ViewType::of::<OtherCellView>().reuse_identifier();
    assert_eq!(
        host.registered_row_identifiers(),
        vec![fallback.as_str(), cell.as_str(), other.as_str()]
    );
    assert!(host.rows[0].1.is::<FallbackView>());
    assert_eq!(host.headers.len(), 1);

    assert_eq!(ds.register_all_known_types(&mut host), 0);
    ds.set_tree(&mut host, DefinitionTree::from_sections([section(&["c"])]));
    assert_eq!(host.rows.len(), 3);
    assert!(ds.registration_cache().contains_header(&ViewType::of::<HeaderView>().reuse_identifier()));
}

#[test]
fn trees_set_before_attach_register_on_attach() {
    let mut host = FakeHost::default();
    let mut ds = DataSource::new(DataSourceOptions::new());
    ds.set_tree(&mut host, DefinitionTree::from_sections([section(&["a"])]));
    assert!(host.rows.is_empty());

    ds.attach(&mut host);
    assert!(ds.is_attached());
    assert_eq!(host.rows.len(), 2);
}

#[test]
fn tree_mut_additions_need_explicit_registration() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["a"])]));
    let key = ds.tree().section_key(0).unwrap();
    ds.tree_mut()
        .append_row(key, Row::new(TextRow::new::<OtherCellView>("late")));

    assert_eq!(ds.register_all_known_types(&mut host), 1);
    let view = ds.bind_view(&mut host, IndexPath::new(0, 1));
    assert_eq!(ds.row_for_view(view.view_id()), ds.tree().row_key(IndexPath::new(0, 1)));
}

#[test]
fn semi_automatic_mode_registers_the_declared_table_only() {
    let mut host = FakeHost::default();
    let table = RegistrationTable::new()
        .with_row_type::<CellView>()
        .with_header("section-header", ViewType::of::<HeaderView>());
    let mut ds = DataSource::new(DataSourceOptions::new().with_registration_table(table));
    ds.attach(&mut host);
    assert_eq!(host.rows.len(), 2);
    assert_eq!(host.headers.len(), 1);

    ds.set_tree(
        &mut host,
        DefinitionTree::from_sections([
            section(&["a"]).with_header_view_identified(ViewType::of::<HeaderView>(), "section-header"),
        ]),
    );
    assert_eq!(host.rows.len(), 2);
    assert!(ds.header_view_for(&mut host, 0).is_some());
    assert_eq!(ds.bind_view(&mut host, IndexPath::new(0, 0)).text.as_deref(), Some("a"));
}

#[test]
fn reuse_identifier_falls_back_for_missing_rows() {
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("a"))
        .with_row(plain("b").with_reuse_identifier("custom"))]);
    let (mut ds, mut host) = attached(tree);

    assert_eq!(ds.reuse_identifier(IndexPath::new(0, 0)), ViewType::of::<CellView>().reuse_identifier());
    assert_eq!(ds.reuse_identifier(IndexPath::new(0, 1)).as_str(), "custom");
    assert_eq!(ds.reuse_identifier(IndexPath::new(7, 0)), FALLBACK_IDENTIFIER);

    let view = ds.bind_view(&mut host, IndexPath::new(7, 0));
    assert_eq!(ds.row_for_view(view.view_id()), None);
}

#[test]
fn bind_view_configures_and_links() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["hello"])]));
    let at = IndexPath::new(0, 0);

    let view = ds.bind_view(&mut host, at);
    let key = ds.tree().row_key(at).unwrap();
    assert_eq!(view.text.as_deref(), Some("hello"));
    assert_eq!(ds.row_for_view(view.view_id()), Some(key));
    assert_eq!(ds.tree().row(key).unwrap().bound_view(), Some(view.view_id()));
    assert_eq!(ds.section_for_view(view.view_id()), ds.tree().section_key(0));
}

#[test]
fn rebinding_a_recycled_view_clears_the_stale_association() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["a", "b"])]));
    let a = ds.tree().row_key(IndexPath::new(0, 0)).unwrap();
    let b = ds.tree().row_key(IndexPath::new(0, 1)).unwrap();

    let view = ds.bind_view(&mut host, IndexPath::new(0, 0));
    let id = view.view_id();
    host.recycle(view);
    let view = ds.bind_view(&mut host, IndexPath::new(0, 1));

    assert_eq!(view.view_id(), id);
    assert_eq!(ds.row_for_view(id), Some(b));
    assert_eq!(ds.tree().row(a).unwrap().bound_view(), None);
    assert_eq!(ds.tree().row(b).unwrap().bound_view(), Some(id));
}

#[test]
fn row_hooks_run_after_content_hooks() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let row = plain("title").on_configure(move |cx| {
        log.borrow_mut().push(cx.view.text.clone());
        cx.view.set_text(Some("override"));
    });
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([Section::new().with_row(row)]));

    let view = ds.bind_view(&mut host, IndexPath::new(0, 0));
    assert_eq!(*seen.borrow(), vec![Some(String::from("title"))]);
    assert_eq!(view.text.as_deref(), Some("override"));
}

#[test]
fn display_hooks_run_once_per_transition() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let (before, after) = (events.clone(), events.clone());
    let row = plain("a")
        .with_selection_style(SelectionStyle::Highlight)
        .before_display(move |cx| before.borrow_mut().push(("will", cx.index_path)))
        .after_display(move |cx| after.borrow_mut().push(("end", cx.index_path)));
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([Section::new().with_row(row)]));
    let at = IndexPath::new(0, 0);
    let mut view = ds.bind_view(&mut host, at);

    assert!(ds.will_display_row(&mut host, at, &mut view));
    assert!(!ds.will_display_row(&mut host, at, &mut view));
    assert_eq!(host.styled, 2);
    assert_eq!(view.selection, Some(SelectionStyle::Highlight));
    assert!(ds.row(at).unwrap().is_onscreen());

    assert!(ds.did_end_display_row(at, &mut view));
    assert!(!ds.did_end_display_row(at, &mut view));
    assert_eq!(ds.row(at).unwrap().display_state(), DisplayState::Offscreen);
    assert_eq!(*events.borrow(), vec![("will", at), ("end", at)]);
}

#[test]
fn did_end_display_follows_the_linked_row() {
    let ended = Rc::new(Cell::new(0usize));
    let counter = ended.clone();
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("a"))
        .with_row(plain("b").after_display(move |cx| {
            assert_eq!(cx.index_path, IndexPath::new(0, 0));
            counter.set(counter.get() + 1);
        }))]);
    let (mut ds, mut host) = attached(tree);

    let at = IndexPath::new(0, 1);
    let mut view = ds.bind_view(&mut host, at);
    ds.will_display_row(&mut host, at, &mut view);

    let s = ds.tree().section_key(0).unwrap();
    let a = ds.tree().row_key(IndexPath::new(0, 0)).unwrap();
    assert!(ds.tree_mut().remove_row(s, a));

    // The host still reports the old index path.
    assert!(ds.did_end_display_row(at, &mut view));
    assert_eq!(ended.get(), 1);
}

#[test]
fn did_end_display_for_removed_content_is_skipped() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["a"])]));
    let at = IndexPath::new(0, 0);
    let mut view = ds.bind_view(&mut host, at);
    ds.will_display_row(&mut host, at, &mut view);

    let s = ds.tree().section_key(0).unwrap();
    assert!(ds.tree_mut().remove_section(s));
    assert!(!ds.did_end_display_row(at, &mut view));
}

#[test]
fn did_end_display_of_a_removed_row_leaves_siblings_onscreen() {
    let ended = Rc::new(Cell::new(0usize));
    let counter = ended.clone();
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("a"))
        .with_row(plain("b").after_display(move |_| counter.set(counter.get() + 1)))]);
    let (mut ds, mut host) = attached(tree);

    let (first, second) = (IndexPath::new(0, 0), IndexPath::new(0, 1));
    let mut va = ds.bind_view(&mut host, first);
    ds.will_display_row(&mut host, first, &mut va);
    let mut vb = ds.bind_view(&mut host, second);
    ds.will_display_row(&mut host, second, &mut vb);

    let s = ds.tree().section_key(0).unwrap();
    let a = ds.tree().row_key(first).unwrap();
    assert!(ds.tree_mut().remove_row(s, a));

    // (0, 0) now resolves to b, which is still shown in vb.
    assert!(!ds.did_end_display_row(first, &mut va));
    assert_eq!(ended.get(), 0);
    assert_eq!(ds.row(first).unwrap().display_state(), DisplayState::Onscreen);
    assert_eq!(ds.row_for_view(vb.view_id()), ds.tree().row_key(first));
}

#[test]
fn did_end_display_of_an_unlinked_view_uses_the_index_path() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["a"])]));
    let at = IndexPath::new(0, 0);
    let mut view = ds.bind_view(&mut host, at);
    ds.will_display_row(&mut host, at, &mut view);
    assert!(ds.unlink_view(view.view_id()).is_some());

    assert!(ds.did_end_display_row(at, &mut view));
    assert_eq!(ds.row(at).unwrap().display_state(), DisplayState::Offscreen);
}

#[test]
fn selection_uses_the_visible_view() {
    let selected = Rc::new(RefCell::new(Vec::new()));
    let (on_select, on_deselect) = (selected.clone(), selected.clone());
    let row = plain("a")
        .on_select(move |cx| on_select.borrow_mut().push((true, cx.view.view_id())))
        .on_deselect(move |cx| on_deselect.borrow_mut().push((false, cx.view.view_id())));
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([Section::new().with_row(row)]));
    let at = IndexPath::new(0, 0);

    assert!(!ds.did_select_row(&mut host, at));

    let view = ds.bind_view(&mut host, at);
    let id = view.view_id();
    host.visible.insert(at, view);
    assert!(ds.did_select_row(&mut host, at));
    assert!(ds.did_deselect_row(&mut host, at));
    assert!(!ds.did_select_row(&mut host, IndexPath::new(0, 5)));
    assert_eq!(*selected.borrow(), vec![(true, id), (false, id)]);
}

#[test]
fn header_views_are_configured_and_tracked() {
    let shown = Rc::new(Cell::new(0usize));
    let counter = shown.clone();
    let tree = DefinitionTree::from_sections([
        section(&["a"]),
        section(&["b"])
            .with_header_view::<HeaderView>()
            .with_header_height(28.0)
            .with_header_text("Second")
            .on_configure_header(|cx| cx.view.set_text(Some("Second")))
            .before_display(move |_| counter.set(counter.get() + 1)),
    ]);
    let (mut ds, mut host) = attached(tree);

    assert!(ds.header_view_for(&mut host, 0).is_none());
    assert_eq!(ds.header_height_for(0), 0.0);
    assert_eq!(ds.header_height_for(1), 28.0);
    assert_eq!(ds.header_height_for(9), 0.0);

    let mut header = ds.header_view_for(&mut host, 1).unwrap();
    assert_eq!(header.text.as_deref(), Some("Second"));
    assert_eq!(ds.section_for_view(header.view_id()), ds.tree().section_key(1));

    assert!(ds.will_display_header(1, &mut header));
    assert!(!ds.will_display_header(1, &mut header));
    assert_eq!(shown.get(), 1);
    assert!(ds.section(1).unwrap().is_onscreen());
    assert!(ds.did_end_display_header(1, &mut header));
    assert!(!ds.did_end_display_header(1, &mut header));
}

#[test]
fn scroll_events_reach_resolved_subscribers_only() {
    let received = Rc::new(RefCell::new(Vec::new()));
    let log = received.clone();
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("quiet"))
        .with_row(plain("listener").on_scroll(move |event, cx| {
            log.borrow_mut().push((event.offset, cx.index_path));
        }))]);
    let (mut ds, mut host) = attached(tree);
    let event = ScrollEvent::new(12.5, 1000.0, 400.0);

    assert_eq!(ds.did_scroll(event), 0);

    ds.reuse_identifier(IndexPath::new(0, 0));
    ds.reuse_identifier(IndexPath::new(0, 1));
    ds.reuse_identifier(IndexPath::new(0, 1));
    assert_eq!(ds.scroll_registry().len(), 1);
    assert_eq!(ds.did_scroll(event), 1);
    assert_eq!(*received.borrow(), vec![(12.5, IndexPath::new(0, 1))]);

    ds.set_tree(&mut host, DefinitionTree::from_sections([section(&["x"])]));
    assert!(ds.scroll_registry().is_empty());
    assert_eq!(ds.did_scroll(event), 0);
}

#[test]
fn scroll_subscribers_removed_from_the_tree_are_pruned() {
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(plain("a").on_scroll(|_, _| {}))
        .with_row(plain("b").on_scroll(|_, _| {}))]);
    let (mut ds, _host) = attached(tree);
    ds.row(IndexPath::new(0, 0));
    ds.row(IndexPath::new(0, 1));

    let s = ds.tree().section_key(0).unwrap();
    let a = ds.tree().row_key(IndexPath::new(0, 0)).unwrap();
    ds.tree_mut().remove_row(s, a);

    assert_eq!(ds.did_scroll(ScrollEvent::default()), 1);
    assert_eq!(ds.scroll_registry().len(), 1);
}

#[test]
fn prefetch_requests_are_tracked() {
    let log = Rc::new(RecorderLog::default());
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(Row::new(Recorder(log.clone())))
        .with_row(Row::new(Recorder(log.clone())))]);
    let (mut ds, mut host) = attached(tree);
    let (first, second) = (IndexPath::new(0, 0), IndexPath::new(0, 1));

    ds.cancel_prefetch([first]);
    assert_eq!(log.cancelled.get(), 0);

    ds.prefetch([first, second, first, IndexPath::new(3, 3)]);
    assert_eq!(log.prefetched.get(), 2);
    assert!(ds.is_prefetching(ds.tree().row_key(first).unwrap()));

    ds.cancel_prefetch([first]);
    assert_eq!(log.cancelled.get(), 1);

    ds.bind_view(&mut host, second);
    assert_eq!(log.configured.get(), 1);
    ds.cancel_prefetch([second]);
    assert_eq!(log.cancelled.get(), 1);
}

#[test]
fn prefetches_of_removed_rows_are_dropped() {
    let log = Rc::new(RecorderLog::default());
    let tree = DefinitionTree::from_sections([Section::new()
        .with_row(Row::new(Recorder(log.clone())))
        .with_row(Row::new(Recorder(log.clone())))]);
    let (mut ds, _host) = attached(tree);
    let (first, second) = (IndexPath::new(0, 0), IndexPath::new(0, 1));

    ds.prefetch([first, second]);
    assert_eq!(ds.prefetch_count(), 2);

    let s = ds.tree().section_key(0).unwrap();
    let a = ds.tree().row_key(first).unwrap();
    assert!(ds.tree_mut().remove_row(s, a));
    assert!(!ds.is_prefetching(a));
    assert_eq!(ds.prefetch_count(), 1);

    ds.cancel_prefetch([first]);
    assert_eq!(log.cancelled.get(), 1);
    assert_eq!(ds.prefetch_count(), 0);
    assert_eq!(ds.prefetching.len(), 0);
}

#[test]
fn validation_collects_every_defect() {
    let mut broken = Section::new().with_row(plain("a"));
    broken.set_header_view_type(Some(ViewType::of::<HeaderView>()));
    let mut orphan_identifier = Section::new();
    orphan_identifier.set_header_identifier(Some("orphan".into()));
    let conflicting = Section::new()
        .with_row(plain("x").with_reuse_identifier("shared"))
        .with_row(Row::new(TextRow::new::<OtherCellView>("y")).with_reuse_identifier("shared"))
        .with_row(plain("z").with_reuse_identifier(""));

    let tree = DefinitionTree::from_sections([broken, orphan_identifier, conflicting]);
    let errors = validate::validate(&tree).unwrap_err();

    assert_eq!(errors.len(), 4);
    assert!(matches!(
        errors.errors()[0],
        ConfigError::HeaderIdentifierMissing { section: 0, .. }
    ));
    assert_eq!(
        errors.errors()[1],
        ConfigError::HeaderTypeMissing {
            section: 1,
            identifier: String::from("orphan")
        }
    );
    assert!(matches!(
        &errors.errors()[2],
        ConfigError::ConflictingViewTypes { identifier, at, .. } if identifier == "shared" && at == "row [2, 0]"
    ));
    assert_eq!(
        errors.errors()[3],
        ConfigError::EmptyRowIdentifier {
            index_path: IndexPath::new(2, 2)
        }
    );
    assert!(errors.to_string().starts_with("invalid list definition: section 0"));
}

#[test]
fn try_set_tree_keeps_the_current_tree_on_error() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["keep"])]));
    let generation = ds.tree().generation();
    let mut bad = Section::new();
    bad.set_header_view_type(Some(ViewType::of::<HeaderView>()));

    assert!(ds.try_set_tree(&mut host, DefinitionTree::from_sections([bad])).is_err());
    assert_eq!(ds.tree().generation(), generation);
    assert_eq!(ds.bind_view(&mut host, IndexPath::new(0, 0)).text.as_deref(), Some("keep"));

    assert!(ds
        .try_set_tree(&mut host, DefinitionTree::from_sections([section(&["new"])]))
        .is_ok());
    assert_eq!(ds.tree().generation(), generation + 1);
}

#[test]
#[should_panic(expected = "invalid list definition")]
fn set_tree_rejects_header_type_without_identifier() {
    let mut bad = Section::new();
    bad.set_header_view_type(Some(ViewType::of::<HeaderView>()));
    attached(DefinitionTree::from_sections([bad]));
}

#[test]
fn set_tree_bumps_generation_and_drops_view_links() {
    let (mut ds, mut host) = attached(DefinitionTree::from_sections([section(&["a"])]));
    let first = ds.tree().generation();
    let view = ds.bind_view(&mut host, IndexPath::new(0, 0));

    ds.set_tree(&mut host, DefinitionTree::from_sections([section(&["b"])]));
    assert_eq!(ds.tree().generation(), first + 1);
    assert_eq!(ds.row_for_view(view.view_id()), None);
    assert_eq!(ds.section_count(), 1);
    assert_eq!(ds.row_count(0), 1);
    assert_eq!(ds.row_count(1), 0);
}

#[test]
fn display_formats() {
    assert_eq!(IndexPath::new(3, 0).to_string(), "[3, 0]");
    assert_eq!(Font::new("Arial", 14.0).to_string(), "Arial-14");
    assert_eq!(Color::rgba(0x12, 0xAB, 0, 0xFF).to_string(), "#12AB00FF");
    assert_eq!(TextAlignment::Center.to_string(), "center");
    assert_eq!(FALLBACK_IDENTIFIER.to_string(), "listdef.fallback");
}
