// Example: measured row heights, and persisting them across data sources.
use listdef::{
    DataSource, DataSourceOptions, DefinitionTree, Font, IndexPath, LabelView, Row, Section,
    TextRow, TextStyle, VerticalInsets, ViewHandle, ViewId,
};

struct TextCell;

#[derive(Default)]
struct View;

impl ViewHandle for View {
    fn view_id(&self) -> ViewId {
        ViewId(0)
    }
}

impl LabelView for View {
    fn set_text(&mut self, _text: Option<&str>) {}
}

// A crude monospace layout: 8pt per character, 20pt per line.
fn measure(text: &str, style: &TextStyle, width: f32) -> f32 {
    let per_line = (width / (style.font.size * 0.5)).max(1.0) as usize;
    let lines = text.chars().count().div_ceil(per_line).max(1);
    lines as f32 * 20.0
}

fn tree() -> DefinitionTree<View> {
    let style = TextStyle::default().with_font(Font::new("Mono", 16.0));
    let rows = ["short", "a considerably longer line that needs to wrap", "short"]
        .into_iter()
        .map(|text| {
            Row::new(
                TextRow::new::<TextCell>(text)
                    .with_style(style.clone())
                    .with_insets(VerticalInsets::new(8.0, 8.0)),
            )
        });
    DefinitionTree::from_sections([Section::new().with_rows(rows)])
}

fn main() {
    let mut ds1 = DataSource::new(DataSourceOptions::new().with_layout_width(160.0));
    ds1.set_measurer(measure);
    *ds1.tree_mut() = tree();

    for row in 0..ds1.row_count(0) {
        println!("row {row}: {}", ds1.height_for(IndexPath::new(0, row)));
    }
    println!(
        "content_height={} stats={:?}",
        ds1.content_height(),
        ds1.heights().stats()
    );

    let snapshot = ds1.export_height_cache();
    println!("exported_cache_len={}", snapshot.len());

    let mut ds2 = DataSource::new(DataSourceOptions::new().with_layout_width(160.0));
    ds2.set_measurer(measure);
    *ds2.tree_mut() = tree();
    ds2.import_height_cache(snapshot);
    println!(
        "after import: content_height={} stats={:?}",
        ds2.content_height(),
        ds2.heights().stats()
    );
}
