use std::cell::Cell;
use std::rc::Rc;

use listdef::{
    DataSourceOptions, DefinitionTree, HostSurface, IndexPath, LabelView, ReuseIdentifier, Row,
    Section, TextStyle, ViewHandle, ViewId, ViewType,
};
use listdef_adapter::{
    EmptyStatePresenter, KeyboardMonitor, ListController, Rect, SurfaceGeometry,
};

struct MessageCell;

#[derive(Debug, Default)]
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

impl HostSurface for Host {
    type View = View;

    fn register_row_type(&mut self, identifier: &ReuseIdentifier, _view_type: ViewType) {
        println!("register {identifier}");
    }

    fn register_header_type(&mut self, _identifier: &ReuseIdentifier, _view_type: ViewType) {}

    fn dequeue_row_view(&mut self, _identifier: &ReuseIdentifier, _at: IndexPath) -> View {
        self.next_id += 1;
        View {
            id: self.next_id,
            text: None,
        }
    }

    fn dequeue_header_view(&mut self, _identifier: &ReuseIdentifier) -> Option<View> {
        None
    }

    fn visible_row_view(&mut self, _at: IndexPath) -> Option<View> {
        None
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        println!("scroll_enabled={enabled}");
    }
}

struct Placeholder;

impl EmptyStatePresenter for Placeholder {
    fn set_visible(&mut self, visible: bool) {
        println!("placeholder visible={visible}");
    }

    fn place(&mut self, area: Rect) {
        println!("placeholder centered at ({}, {})", area.mid_x(), area.mid_y());
    }
}

struct Keyboard(Rc<Cell<Option<Rect>>>);

impl KeyboardMonitor for Keyboard {
    fn keyboard_frame(&self) -> Option<Rect> {
        self.0.get()
    }
}

fn main() {
    // Example: a controller driving an inbox that starts empty.
    //
    // An adapter would:
    // - call load() once the surface exists
    // - forward surface events (bind, display, scroll) to the controller
    // - request reloads when the model changes and flush() once per frame
    let messages: Rc<Cell<usize>> = Rc::new(Cell::new(0));
    let keyboard = Rc::new(Cell::new(None));

    let source = messages.clone();
    let generate = move || {
        let n = source.get();
        if n == 0 {
            return DefinitionTree::new();
        }
        DefinitionTree::from_sections([Section::new().with_rows(
            (0..n).map(|i| Row::text::<MessageCell>(format!("message #{i}"))),
        )])
    };

    let mut c = ListController::new(
        Host::default(),
        DataSourceOptions::new().with_layout_width(320.0),
        generate,
    )
    .with_empty_state(Placeholder)
    .with_keyboard_monitor(Keyboard(keyboard.clone()));
    c.data_source_mut()
        .set_measurer(|text: &str, _: &TextStyle, _: f32| -> f32 { 20.0 * (1 + text.len() / 40) as f32 });

    c.set_geometry(SurfaceGeometry {
        frame: Rect::new(0.0, 64.0, 320.0, 600.0),
        content_inset_top: 0.0,
        header_height: None,
    });
    c.load();

    keyboard.set(Some(Rect::new(0.0, 400.0, 320.0, 264.0)));
    c.keyboard_will_change();

    messages.set(3);
    c.request_reload();
    c.request_reload();
    println!("flushed={:?}", c.flush());

    for row in 0..c.row_count(0) {
        let at = IndexPath::new(0, row);
        let mut view = c.bind_view(at);
        c.will_display_row(at, &mut view);
        println!("{at}: {:?}", view.text);
    }
    println!(
        "content_height={} stats={:?}",
        c.content_height(),
        c.relayout_stats()
    );
}
