//! Application state for the menu bar host.
//!
//! The `App` owns the menu bar state, the document pointer bus the bar
//! subscribes to, the active theme, and the rat-focus tree spanning the bar's
//! tab stops and a content pane.

use std::rc::Rc;

use menubar_types::{ItemSelectEvent, MenuBarEffect};
use menubar_util::MenuBarConfig;
use rat_focus::{Focus, FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tracing::info;

use crate::ui::components::menu_bar::{DocumentPointerBus, MenuBarState};
use crate::ui::theme::{NordTheme, Theme};

pub struct App {
    /// Menu bar state (items, split, dropdown, roving focus)
    pub menu_bar: MenuBarState,
    /// Document-wide pointer-down events for outside-click detection
    pub pointer_bus: DocumentPointerBus,
    /// Active theme
    pub theme: Box<dyn Theme>,
    /// Focus tree rebuilt before each render
    pub focus: Rc<Focus>,
    /// Tab stop for the content pane below the bar
    pub content_focus: FocusFlag,
    container_focus: FocusFlag,
    /// Last item selection reported by the bar
    pub last_selection: Option<ItemSelectEvent>,
}

impl App {
    /// Builds the app from configuration and mounts the menu bar.
    pub fn new(config: &MenuBarConfig) -> Self {
        let mut menu_bar = MenuBarState::new(config);
        menu_bar.set_children(config.slot_children());
        let mut pointer_bus = DocumentPointerBus::new();
        menu_bar.mount(&mut pointer_bus);

        let mut app = Self {
            menu_bar,
            pointer_bus,
            theme: Box::new(NordTheme::new()),
            focus: Rc::new(Focus::default()),
            content_focus: FocusFlag::named("content"),
            container_focus: FocusFlag::named("app"),
            last_selection: None,
        };
        app.rebuild_focus();
        app
    }

    /// Rebuilds the focus tree so the toggle's tab stop follows its visibility.
    pub fn rebuild_focus(&mut self) {
        let old_focus = std::mem::take(&mut self.focus);
        self.focus = Rc::new(FocusBuilder::rebuild_for(self, Some(Rc::unwrap_or_clone(old_focus))));
    }

    /// True when keyboard input belongs to the menu bar.
    pub fn menu_bar_has_focus(&self) -> bool {
        self.menu_bar.bar_focus.get() || self.menu_bar.toggle_focus.get() || self.menu_bar.dropdown.is_open()
    }

    /// Applies effects reported by the menu bar to the focus tree and the
    /// selection shown in the content pane.
    pub fn apply_effects(&mut self, effects: Vec<MenuBarEffect>) {
        if effects.is_empty() {
            return;
        }
        self.rebuild_focus();
        for effect in effects {
            match effect {
                MenuBarEffect::ItemSelected(event) => {
                    info!(item = %event.item, label = %event.label, source = ?event.source, "item selected");
                    self.last_selection = Some(event);
                }
                MenuBarEffect::FocusToggle => {
                    self.focus.focus(&self.menu_bar.toggle_focus);
                }
                MenuBarEffect::FocusBar => {
                    self.focus.focus(&self.menu_bar.bar_focus);
                }
                MenuBarEffect::FocusNext => {
                    self.focus.next();
                }
                MenuBarEffect::FocusPrev => {
                    self.focus.prev();
                }
            }
        }
        self.menu_bar.sync_focus_from_flags();
    }
}

impl HasFocus for App {
    fn build(&self, builder: &mut FocusBuilder) {
        let tag = builder.start(self);
        builder.widget(&self.menu_bar);
        builder.leaf_widget(&self.content_focus);
        builder.end(tag);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::menu_bar::navigator::FocusContext;
    use menubar_types::{ActivationSource, ItemId};
    use menubar_util::MenuItemConfig;

    fn config() -> MenuBarConfig {
        MenuBarConfig {
            items: ["Home", "Docs"]
                .into_iter()
                .map(|label| MenuItemConfig {
                    label: label.to_string(),
                    disabled: false,
                })
                .collect(),
            ..MenuBarConfig::default()
        }
    }

    #[test]
    fn new_app_mounts_bar_with_configured_items() {
        let app = App::new(&config());
        assert!(app.menu_bar.is_mounted());
        assert_eq!(app.menu_bar.items().len(), 2);
        assert_eq!(app.pointer_bus.subscriber_count(), 1);
    }

    #[test]
    fn focus_bar_effect_moves_roving_focus_into_bar() {
        let mut app = App::new(&config());
        app.apply_effects(vec![MenuBarEffect::FocusBar]);
        assert!(app.menu_bar.bar_focus.get());
        assert_eq!(app.menu_bar.focus_context(), FocusContext::Bar { index: Some(0) });
    }

    #[test]
    fn selection_effect_is_recorded() {
        let mut app = App::new(&config());
        let event = ItemSelectEvent {
            item: ItemId(1),
            label: "Docs".into(),
            source: ActivationSource::Inline,
        };
        app.apply_effects(vec![MenuBarEffect::ItemSelected(event.clone())]);
        assert_eq!(app.last_selection, Some(event));
    }
}
