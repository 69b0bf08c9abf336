use super::item::{ItemId, MenuItem};
use crate::arbiter::{Arbiter, Gesture};
use crate::config::Config;
use crate::drag::{AnchorState, DragController, DragEvent, PointerEvent};
use crate::geometry::{Point, Rect, Viewport};
use crate::layout::{Layout, LayoutInput, compute_layout};
use serde::Serialize;
use std::time::Instant;
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

/// Process-wide listeners the host attaches on behalf of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum ListenerKind {
    Resize,
    PointerMove,
    PointerUp,
}

/// Implemented by the embedding runtime. Every `register` is matched by exactly
/// one `unregister`.
pub trait ListenerHost {
    fn register(&mut self, kind: ListenerKind);
    fn unregister(&mut self, kind: ListenerKind);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Click synthesized by the host after a release.
    Click,
    Resize(Viewport),
    AnchorMeasured(f64),
    Select(usize),
    Close,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuUpdate {
    pub should_redraw: bool,
    pub gesture: Option<Gesture>,
    pub activated: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub index: usize,
    pub id: ItemId,
    pub rect: Rect,
    pub icon_size: f64,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub anchor: AnchorState,
    pub anchor_center: Point,
    pub open: bool,
    pub hovered: Option<usize>,
    pub viewport: Option<Viewport>,
    pub layout: Layout,
    pub hotspots: Vec<Hotspot>,
}

/// Live menu instance held by the host. Routes events through the drag
/// controller and the arbiter and keeps the layout in sync.
pub struct RadialMenu {
    config: Config,
    items: Vec<MenuItem>,
    controller: DragController,
    anchor: AnchorState,
    arbiter: Arbiter,
    viewport: Option<Viewport>,
    layout: Layout,
    registered: Vec<ListenerKind>,
}

impl RadialMenu {
    pub fn new(config: Config, items: Vec<MenuItem>, anchor: Point) -> Self {
        let mut menu = Self {
            controller: DragController::new(config.drag_threshold, config.anchor_size),
            arbiter: Arbiter::new(config.toggle_cooldown()),
            viewport: config.viewport,
            anchor: AnchorState::at(anchor),
            layout: Layout::default(),
            registered: Vec::new(),
            config,
            items,
        };
        menu.anchor = menu.controller.reclamp(menu.anchor, menu.viewport);
        menu.relayout();
        menu
    }

    pub fn from_config(config: Config, anchor: Point) -> Self {
        let items = config.items.iter().map(MenuItem::from_config).collect();
        Self::new(config, items, anchor)
    }

    pub fn apply_config(&mut self, config: Config) {
        self.items = config.items.iter().map(MenuItem::from_config).collect();
        self.controller.threshold = config.drag_threshold;
        if config.anchor_size.is_some() {
            self.controller.element_size = config.anchor_size;
        }
        self.arbiter.set_cooldown(config.toggle_cooldown());
        if self.viewport.is_none() {
            self.viewport = config.viewport;
        }
        self.config = config;
        self.arbiter.hover(None);
        self.anchor = self.controller.reclamp(self.anchor, self.viewport);
        self.relayout();
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn anchor(&self) -> &AnchorState {
        &self.anchor
    }

    pub fn anchor_center(&self) -> Point {
        self.controller.anchor_center(&self.anchor)
    }

    pub fn is_open(&self) -> bool {
        self.arbiter.open
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn mount(&mut self, host: &mut dyn ListenerHost) {
        self.listen(host, ListenerKind::Resize);
    }

    pub fn unmount(&mut self, host: &mut dyn ListenerHost) {
        for kind in std::mem::take(&mut self.registered) {
            host.unregister(kind);
        }
        self.anchor = self.controller.end(self.anchor);
    }

    fn listen(&mut self, host: &mut dyn ListenerHost, kind: ListenerKind) {
        if !self.registered.contains(&kind) {
            host.register(kind);
            self.registered.push(kind);
        }
    }

    fn unlisten(&mut self, host: &mut dyn ListenerHost, kind: ListenerKind) {
        if let Some(pos) = self.registered.iter().position(|k| *k == kind) {
            host.unregister(kind);
            self.registered.remove(pos);
        }
    }

    pub fn handle(
        &mut self,
        event: MenuEvent,
        now: Instant,
        host: &mut dyn ListenerHost,
    ) -> MenuUpdate {
        match event {
            MenuEvent::PointerDown(e) => self.pointer_down(e, host),
            MenuEvent::PointerMove(e) => self.pointer_move(e),
            MenuEvent::PointerUp(e) => self.pointer_up(e, now, host),
            MenuEvent::Click => self.resolve(now),
            MenuEvent::Resize(viewport) => {
                self.viewport = Some(viewport);
                self.drag(DragEvent::ViewportResized)
            }
            MenuEvent::AnchorMeasured(size) => {
                self.controller.element_size = Some(size);
                self.drag(DragEvent::ViewportResized)
            }
            MenuEvent::Select(index) => self.select(index),
            MenuEvent::Close => {
                let closed = self.arbiter.close();
                self.relayout();
                MenuUpdate {
                    should_redraw: closed,
                    ..MenuUpdate::default()
                }
            }
        }
    }

    fn anchor_rect(&self) -> Rect {
        Rect::centered(self.anchor_center(), self.controller.element_size())
    }

    fn pointer_down(&mut self, e: PointerEvent, host: &mut dyn ListenerHost) -> MenuUpdate {
        if !e.kind.is_primary() || !self.anchor_rect().contains(e.position) {
            return MenuUpdate::default();
        }
        self.anchor = self.controller.start(self.anchor, e);
        self.listen(host, ListenerKind::PointerMove);
        self.listen(host, ListenerKind::PointerUp);
        MenuUpdate::default()
    }

    fn pointer_move(&mut self, e: PointerEvent) -> MenuUpdate {
        if self.anchor.dragging {
            return self.drag(DragEvent::Move(e));
        }
        let hovered = self.hit_test(e.position);
        MenuUpdate {
            should_redraw: self.arbiter.hover(hovered),
            ..MenuUpdate::default()
        }
    }

    fn pointer_up(
        &mut self,
        e: PointerEvent,
        now: Instant,
        host: &mut dyn ListenerHost,
    ) -> MenuUpdate {
        if self.anchor.is_grabbed_by(e.kind) {
            self.anchor = self.controller.release(self.anchor, e);
            self.unlisten(host, ListenerKind::PointerMove);
            self.unlisten(host, ListenerKind::PointerUp);
            return self.resolve(now);
        }
        if self.anchor.dragging {
            return MenuUpdate::default();
        }
        match self.hit_test(e.position) {
            Some(index) => self.select(index),
            None => MenuUpdate::default(),
        }
    }

    fn resolve(&mut self, now: Instant) -> MenuUpdate {
        let gesture = self.arbiter.release(self.anchor.moved_beyond_threshold, now);
        if let Gesture::Toggled { open } = gesture {
            log::debug!("menu {}", if open { "opened" } else { "closed" });
        }
        self.relayout();
        MenuUpdate {
            should_redraw: matches!(gesture, Gesture::Toggled { .. }),
            gesture: Some(gesture),
            activated: None,
        }
    }

    fn drag(&mut self, event: DragEvent) -> MenuUpdate {
        let before = self.anchor.position;
        self.anchor = self.controller.reduce(self.anchor, event, self.viewport);
        self.relayout();
        MenuUpdate {
            should_redraw: before != self.anchor.position || self.arbiter.open,
            ..MenuUpdate::default()
        }
    }

    fn select(&mut self, index: usize) -> MenuUpdate {
        let Some(item) = self.items.get(index).cloned() else {
            return MenuUpdate::default();
        };
        if self.arbiter.select(index).is_none() {
            return MenuUpdate::default();
        }
        item.activate();
        self.relayout();
        MenuUpdate {
            should_redraw: true,
            gesture: None,
            activated: Some(item.id),
        }
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(&LayoutInput {
            open: self.arbiter.open,
            anchor_center: self.anchor_center(),
            item_count: self.items.len(),
            base_radius: self.config.orbit_radius,
            item_size: self.config.item_size,
            viewport: self.viewport,
        });
    }

    /// Screen rectangles of the items, in layout order. The hovered one is
    /// scaled up.
    pub fn hotspots(&self) -> Vec<Hotspot> {
        let center = self.anchor_center();
        self.layout
            .placements
            .iter()
            .filter_map(|p| {
                let item = self.items.get(p.index)?;
                let hovered = self.arbiter.hovered == Some(p.index);
                let scale = if hovered { self.config.hover_scale } else { 1.0 };
                Some(Hotspot {
                    index: p.index,
                    id: item.id.clone(),
                    rect: Rect::centered(p.absolute(center), self.config.item_size * scale),
                    icon_size: self.config.item_icon_size * scale,
                    hovered,
                })
            })
            .collect()
    }

    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.hotspots()
            .into_iter()
            .find(|h| h.rect.contains(point))
            .map(|h| h.index)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            anchor: self.anchor,
            anchor_center: self.anchor_center(),
            open: self.arbiter.open,
            hovered: self.arbiter.hovered,
            viewport: self.viewport,
            layout: self.layout.clone(),
            hotspots: self.hotspots(),
        }
    }

    pub fn listeners(&self) -> impl Iterator<Item = ListenerKind> + '_ {
        ListenerKind::iter().filter(|k| self.registered.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemConfig;
    use crate::menu::{ItemLabel, ShellCommand};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHost {
        active: Vec<ListenerKind>,
        calls: usize,
    }

    impl ListenerHost for RecordingHost {
        fn register(&mut self, kind: ListenerKind) {
            assert!(!self.active.contains(&kind), "{kind} registered twice");
            self.active.push(kind);
            self.calls += 1;
        }

        fn unregister(&mut self, kind: ListenerKind) {
            let pos = self.active.iter().position(|k| *k == kind);
            assert!(pos.is_some(), "{kind} was never registered");
            self.active.retain(|k| *k != kind);
            self.calls += 1;
        }
    }

    fn menu_with(count: usize, log: &Rc<RefCell<Vec<String>>>) -> RadialMenu {
        let config = Config {
            viewport: Some(Viewport::new(1000.0, 1000.0)),
            anchor_size: Some(50.0),
            ..Config::default()
        };
        let items = (0..count)
            .map(|i| {
                let log = log.clone();
                MenuItem::new(format!("item-{i}"), format!("Item {i}"), move || {
                    log.borrow_mut().push(format!("item-{i}"))
                })
            })
            .collect();
        // anchor center lands on (500, 500)
        RadialMenu::new(config, items, Point::new(475.0, 475.0))
    }

    fn gesture(
        menu: &mut RadialMenu,
        host: &mut RecordingHost,
        dx: f64,
        now: Instant,
    ) -> MenuUpdate {
        menu.handle(MenuEvent::PointerDown(PointerEvent::mouse(500.0, 500.0)), now, host);
        menu.handle(
            MenuEvent::PointerMove(PointerEvent::mouse(500.0 + dx, 500.0)),
            now,
            host,
        );
        menu.handle(
            MenuEvent::PointerUp(PointerEvent::mouse(500.0 + dx, 500.0)),
            now,
            host,
        )
    }

    #[test]
    fn test_short_press_toggles_long_drag_does_not() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(7, &log);
        let mut host = RecordingHost::default();
        let t0 = Instant::now();

        let update = gesture(&mut menu, &mut host, 3.0, t0);
        assert_eq!(update.gesture, Some(Gesture::Toggled { open: true }));
        assert!(menu.is_open());
        assert_eq!(menu.layout().placements.len(), 7);

        let update = gesture(&mut menu, &mut host, 20.0, t0 + Duration::from_secs(1));
        assert_eq!(update.gesture, Some(Gesture::Drag));
        assert!(menu.is_open());
        assert_eq!(menu.anchor().position, Point::new(498.0, 475.0));

        // the click the host synthesizes after the drag is ignored too
        let update = menu.handle(MenuEvent::Click, t0 + Duration::from_secs(1), &mut host);
        assert_eq!(update.gesture, Some(Gesture::Drag));
        assert!(menu.is_open());
    }

    #[test]
    fn test_duplicate_click_after_release_is_suppressed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(3, &log);
        let mut host = RecordingHost::default();
        let t0 = Instant::now();

        gesture(&mut menu, &mut host, 0.0, t0);
        let update = menu.handle(MenuEvent::Click, t0 + Duration::from_millis(5), &mut host);
        assert_eq!(update.gesture, Some(Gesture::Suppressed));
        assert!(menu.is_open());
    }

    #[test]
    fn test_listeners_are_scoped_to_drag_and_mount() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(3, &log);
        let mut host = RecordingHost::default();
        let now = Instant::now();

        menu.mount(&mut host);
        assert_eq!(host.active, vec![ListenerKind::Resize]);

        menu.handle(MenuEvent::PointerDown(PointerEvent::mouse(490.0, 490.0)), now, &mut host);
        assert_eq!(menu.listeners().count(), 3);
        menu.handle(MenuEvent::PointerUp(PointerEvent::mouse(490.0, 490.0)), now, &mut host);
        assert_eq!(host.active, vec![ListenerKind::Resize]);

        // a press off the anchor never starts a drag
        menu.handle(MenuEvent::PointerDown(PointerEvent::mouse(10.0, 10.0)), now, &mut host);
        assert_eq!(host.active, vec![ListenerKind::Resize]);

        menu.handle(MenuEvent::PointerDown(PointerEvent::mouse(490.0, 490.0)), now, &mut host);
        menu.unmount(&mut host);
        assert!(host.active.is_empty());
        assert_eq!(host.calls, 10);
        assert!(!menu.anchor().dragging);
    }

    #[test]
    fn test_selecting_item_runs_action_once_and_closes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(5, &log);
        let mut host = RecordingHost::default();
        let t0 = Instant::now();

        gesture(&mut menu, &mut host, 0.0, t0);
        let target = menu.hotspots()[2].clone();
        let center = Point::new(
            target.rect.x + target.rect.width / 2.0,
            target.rect.y + target.rect.height / 2.0,
        );

        let hover = MenuEvent::PointerMove(PointerEvent::mouse(center.x, center.y));
        menu.handle(hover, t0, &mut host);
        assert_eq!(menu.snapshot().hovered, Some(target.index));
        assert!(menu.hotspots().iter().any(|h| h.hovered && h.rect.width > 48.0));

        let release = MenuEvent::PointerUp(PointerEvent::mouse(center.x, center.y));
        let update = menu.handle(release, t0, &mut host);
        assert_eq!(update.activated, Some(target.id.clone()));
        assert_eq!(*log.borrow(), vec![target.id.to_string()]);
        assert!(!menu.is_open());
        assert_eq!(menu.snapshot().hovered, None);
        assert!(menu.layout().placements.is_empty());

        // selecting while closed does nothing
        let update = menu.handle(MenuEvent::Select(0), t0, &mut host);
        assert_eq!(update.activated, None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_resize_reclamps_anchor_and_relayouts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(4, &log);
        let mut host = RecordingHost::default();
        let t0 = Instant::now();

        gesture(&mut menu, &mut host, 0.0, t0);
        menu.handle(MenuEvent::Resize(Viewport::new(300.0, 300.0)), t0, &mut host);

        assert_eq!(menu.anchor().position, Point::new(250.0, 250.0));
        let snapshot = menu.snapshot();
        assert_eq!(snapshot.layout.placements.len(), 4);
        for h in &snapshot.hotspots {
            assert!(h.rect.x >= 0.0 && h.rect.x + h.rect.width <= 300.0);
            assert!(h.rect.y >= 0.0 && h.rect.y + h.rect.height <= 300.0);
        }
    }

    #[test]
    fn test_second_pointer_does_not_end_drag() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(3, &log);
        let mut host = RecordingHost::default();
        let now = Instant::now();

        menu.handle(MenuEvent::PointerDown(PointerEvent::touch(500.0, 500.0, 0)), now, &mut host);
        let stray = PointerEvent::touch(900.0, 900.0, 1);
        menu.handle(MenuEvent::PointerMove(stray), now, &mut host);
        let update = menu.handle(MenuEvent::PointerUp(stray), now, &mut host);

        assert_eq!(update.gesture, None);
        assert!(menu.anchor().dragging);
        assert_eq!(menu.anchor().position, Point::new(475.0, 475.0));
        assert_eq!(menu.listeners().count(), 2);

        let lift = PointerEvent::touch(500.0, 500.0, 0);
        let update = menu.handle(MenuEvent::PointerUp(lift), now, &mut host);
        assert_eq!(update.gesture, Some(Gesture::Toggled { open: true }));
        assert_eq!(menu.listeners().count(), 0);
    }

    #[test]
    fn test_reload_keeps_open_state_and_reclamps_anchor() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut menu = menu_with(3, &log);
        let mut host = RecordingHost::default();
        let t0 = Instant::now();

        // drag the anchor against the right edge, then open the menu with a tap
        gesture(&mut menu, &mut host, 600.0, t0);
        assert_eq!(menu.anchor().position, Point::new(950.0, 475.0));
        let tap = PointerEvent::mouse(975.0, 500.0);
        let t1 = t0 + Duration::from_secs(1);
        menu.handle(MenuEvent::PointerDown(tap), t1, &mut host);
        menu.handle(MenuEvent::PointerUp(tap), t1, &mut host);
        assert!(menu.is_open());

        let config = Config {
            viewport: Some(Viewport::new(1000.0, 1000.0)),
            anchor_size: Some(200.0),
            items: (0..5)
                .map(|i| ItemConfig {
                    id: ItemId::new(format!("new-{i}")),
                    label: ItemLabel::new(format!("New {i}")),
                    description: None,
                    exec: ShellCommand::new("true"),
                })
                .collect(),
            ..Config::default()
        };
        menu.apply_config(config);

        assert!(menu.is_open());
        assert_eq!(menu.items().len(), 5);
        assert_eq!(menu.layout().placements.len(), 5);
        assert_eq!(menu.anchor().position, Point::new(800.0, 475.0));
        assert!(menu.anchor().position.x + 200.0 <= 1000.0);

        let update = menu.handle(MenuEvent::Close, t1, &mut host);
        assert!(update.should_redraw);
    }

    #[test]
    fn test_closed_menu_without_viewport_has_no_layout() {
        let menu = RadialMenu::new(Config::default(), Vec::new(), Point::default());
        assert!(menu.layout().placements.is_empty());
        assert_eq!(menu.anchor_center(), Point::new(25.0, 25.0));
    }
}
