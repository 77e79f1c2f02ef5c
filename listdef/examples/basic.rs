// Example: a two-section list driven by a minimal host.
use listdef::{
    DataSource, DataSourceOptions, DefinitionTree, HostSurface, IndexPath, LabelView,
    ReuseIdentifier, Row, ScrollEvent, Section, SelectionStyle, ViewHandle, ViewId, ViewType,
};

struct TitleCell;
struct TitleHeader;

#[derive(Clone, Debug, Default)]
struct View {
    id: u64,
    text: Option<String>,
}

impl ViewHandle for View {
    fn view_id(&self) -> ViewId {
        ViewId(self.id)
    }
}

impl LabelView for View {
    fn set_text(&mut self, text: Option<&str>) {
        self.text = text.map(str::to_owned);
    }
}

#[derive(Default)]
struct Host {
    next_id: u64,
}

impl Host {
    fn make_view(&mut self) -> View {
        self.next_id += 1;
        View {
            id: self.next_id,
            text: None,
        }
    }
}

impl HostSurface for Host {
    type View = View;

    fn register_row_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType) {
        println!("register row {identifier} -> {}", view_type.name());
    }

    fn register_header_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType) {
        println!("register header {identifier} -> {}", view_type.name());
    }

    fn dequeue_row_view(&mut self, _identifier: &ReuseIdentifier, _at: IndexPath) -> View {
        self.make_view()
    }

    fn dequeue_header_view(&mut self, _identifier: &ReuseIdentifier) -> Option<View> {
        Some(self.make_view())
    }

    fn visible_row_view(&mut self, _at: IndexPath) -> Option<View> {
        None
    }
}

fn main() {
    let tree = DefinitionTree::from_sections([
        Section::<View>::new()
            .with_header_view::<TitleHeader>()
            .with_header_height(28.0)
            .on_configure_header(|cx| cx.view.set_text(Some("Fruit")))
            .with_row(Row::plain::<TitleCell>("Apple"))
            .with_row(
                Row::plain::<TitleCell>("Banana").with_selection_style(SelectionStyle::Highlight),
            ),
        Section::new().with_row(
            Row::plain::<TitleCell>("Footer")
                .on_scroll(|event, cx| println!("{} saw offset {}", cx.index_path, event.offset)),
        ),
    ]);

    let mut host = Host::default();
    let mut ds = DataSource::new(DataSourceOptions::new());
    ds.attach(&mut host);
    ds.set_tree(&mut host, tree);

    for section in 0..ds.section_count() {
        if let Some(header) = ds.header_view_for(&mut host, section) {
            println!("header {section}: {:?}", header.text);
        }
        for row in 0..ds.row_count(section) {
            let at = IndexPath::new(section, row);
            let mut view = ds.bind_view(&mut host, at);
            ds.will_display_row(&mut host, at, &mut view);
            println!("{at} {:?} height={}", view.text, ds.height_for(at));
        }
    }

    let ran = ds.did_scroll(ScrollEvent::new(80.0, 176.0, 120.0));
    println!("scroll handlers run: {ran}");
}
