//! Menu bar and named actions.
//!
//! The menu is a declarative tree of [`Submenu`]s whose entries refer to
//! actions by [`ActionId`]. Every action belongs to an [`ActionGroup`] that
//! decides when it is sensitive, and toggle or radio actions carry an
//! active flag. Radio actions in one [`RadioGroup`] always have exactly one
//! active member.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::options::{OutputFormat, SafeMode};

/// Named menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    Open,
    Revert,
    ExportHtml,
    Quit,
    Copy,
    SelectAll,
    Preferences,
    ZoomIn,
    ZoomOut,
    ZoomNormal,
    ViewSource,
    EnableAttributes,
    SmartEmphasis,
    LazyOl,
    OutputFormat(OutputFormat),
    SafeMode(SafeMode),
    About,
}

/// Sensitivity class of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionGroup {
    /// Always available
    Default,
    /// Available while a document is loaded
    Document,
    /// Available while the view has a non-empty selection
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioGroup {
    OutputFormat,
    SafeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Plain,
    Toggle,
    Radio(RadioGroup),
}

/// A Ctrl-based keyboard accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accel {
    /// Characters that trigger the accelerator (layout alternatives)
    keys: &'static [char],
    /// Required Shift state; `None` accepts either
    shift: Option<bool>,
    label: &'static str,
}

impl Accel {
    const fn ctrl(keys: &'static [char], label: &'static str) -> Self {
        Self {
            keys,
            shift: Some(false),
            label,
        }
    }

    const fn ctrl_any(keys: &'static [char], label: &'static str) -> Self {
        Self {
            keys,
            shift: None,
            label,
        }
    }

    const fn ctrl_shift(keys: &'static [char], label: &'static str) -> Self {
        Self {
            keys,
            shift: Some(true),
            label,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.label
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        let KeyCode::Char(c) = key.code else {
            return false;
        };
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT) || c.is_ascii_uppercase();
        let c = c.to_ascii_lowercase();
        self.keys.contains(&c) && self.shift.is_none_or(|shift| shift == shifted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    pub label: &'static str,
    pub group: ActionGroup,
    pub kind: ActionKind,
    pub accel: Option<Accel>,
    active: bool,
}

impl Action {
    const fn new(id: ActionId, label: &'static str, group: ActionGroup) -> Self {
        Self {
            id,
            label,
            group,
            kind: ActionKind::Plain,
            accel: None,
            active: false,
        }
    }

    const fn toggle(mut self) -> Self {
        self.kind = ActionKind::Toggle;
        self
    }

    const fn radio(mut self, group: RadioGroup, active: bool) -> Self {
        self.kind = ActionKind::Radio(group);
        self.active = active;
        self
    }

    const fn accel(mut self, accel: Accel) -> Self {
        self.accel = Some(accel);
        self
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item(ActionId),
    Separator,
    Submenu {
        label: &'static str,
        items: Vec<ActionId>,
    },
}

/// A top-level menu in the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub title: &'static str,
    pub entries: Vec<MenuEntry>,
}

/// One row of an open dropdown. Nested submenus are shown inline under
/// their label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRow {
    Item { id: ActionId, nested: bool },
    Label(&'static str),
    Separator,
}

const OUTPUT_FORMATS: [(OutputFormat, &str); 4] = [
    (OutputFormat::Html5, "HTML 5"),
    (OutputFormat::Html4, "HTML 4"),
    (OutputFormat::Xhtml1, "XHTML 1.1"),
    (OutputFormat::Xhtml5, "XHTML '5'"),
];

const SAFE_MODES: [(SafeMode, &str); 4] = [
    (SafeMode::Off, "None"),
    (SafeMode::Replace, "Replace"),
    (SafeMode::Remove, "Remove"),
    (SafeMode::Escape, "Escape"),
];

#[derive(Debug, Clone)]
pub struct Menu {
    menus: Vec<Submenu>,
    actions: Vec<Action>,
    document_available: bool,
    selection_available: bool,
    open: Option<usize>,
    selected: usize,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        use ActionGroup::{Default, Document, Selection};

        let mut actions = vec![
            Action::new(ActionId::Open, "Open…", Default).accel(Accel::ctrl(&['o'], "Ctrl+O")),
            Action::new(ActionId::Revert, "Revert", Document),
            Action::new(ActionId::ExportHtml, "Export HTML…", Document)
                .accel(Accel::ctrl_shift(&['e'], "Shift+Ctrl+E")),
            Action::new(ActionId::Quit, "Quit", Default).accel(Accel::ctrl(&['q'], "Ctrl+Q")),
            Action::new(ActionId::Copy, "Copy", Selection).accel(Accel::ctrl(&['c'], "Ctrl+C")),
            Action::new(ActionId::SelectAll, "Select All", Document)
                .accel(Accel::ctrl(&['a'], "Ctrl+A")),
            Action::new(ActionId::Preferences, "Preferences", Default),
            Action::new(ActionId::ZoomIn, "Zoom In", Document)
                .accel(Accel::ctrl_any(&['+', '='], "Ctrl++")),
            Action::new(ActionId::ZoomOut, "Zoom Out", Document)
                .accel(Accel::ctrl_any(&['-', '_'], "Ctrl+-")),
            Action::new(ActionId::ZoomNormal, "Normal Size", Document)
                .accel(Accel::ctrl_any(&['0'], "Ctrl+0")),
            Action::new(ActionId::ViewSource, "View source", Document)
                .toggle()
                .accel(Accel::ctrl(&['u'], "Ctrl+U")),
            Action::new(ActionId::EnableAttributes, "Enable attributes", Document).toggle(),
            Action::new(ActionId::SmartEmphasis, "Smart emphasis", Document).toggle(),
            Action::new(ActionId::LazyOl, "Lazy ol", Document).toggle(),
        ];
        for (i, (format, label)) in OUTPUT_FORMATS.into_iter().enumerate() {
            actions.push(
                Action::new(ActionId::OutputFormat(format), label, Document)
                    .radio(RadioGroup::OutputFormat, i == 0),
            );
        }
        for (i, (mode, label)) in SAFE_MODES.into_iter().enumerate() {
            actions.push(
                Action::new(ActionId::SafeMode(mode), label, Document)
                    .radio(RadioGroup::SafeMode, i == 0),
            );
        }
        actions.push(Action::new(ActionId::About, "About", Default));

        let menus = vec![
            Submenu {
                title: "File",
                entries: vec![
                    MenuEntry::Item(ActionId::Open),
                    MenuEntry::Separator,
                    MenuEntry::Item(ActionId::Revert),
                    MenuEntry::Item(ActionId::ExportHtml),
                    MenuEntry::Separator,
                    MenuEntry::Item(ActionId::Quit),
                ],
            },
            Submenu {
                title: "Edit",
                entries: vec![
                    MenuEntry::Item(ActionId::Copy),
                    MenuEntry::Separator,
                    MenuEntry::Item(ActionId::SelectAll),
                    MenuEntry::Separator,
                    MenuEntry::Item(ActionId::Preferences),
                ],
            },
            Submenu {
                title: "View",
                entries: vec![
                    MenuEntry::Item(ActionId::ZoomIn),
                    MenuEntry::Item(ActionId::ZoomOut),
                    MenuEntry::Item(ActionId::ZoomNormal),
                    MenuEntry::Separator,
                    MenuEntry::Item(ActionId::ViewSource),
                ],
            },
            Submenu {
                title: "Markdown",
                entries: vec![
                    MenuEntry::Item(ActionId::EnableAttributes),
                    MenuEntry::Item(ActionId::SmartEmphasis),
                    MenuEntry::Item(ActionId::LazyOl),
                    MenuEntry::Separator,
                    MenuEntry::Submenu {
                        label: "Output format",
                        items: OUTPUT_FORMATS
                            .map(|(format, _)| ActionId::OutputFormat(format))
                            .to_vec(),
                    },
                    MenuEntry::Submenu {
                        label: "Safe mode",
                        items: SAFE_MODES.map(|(mode, _)| ActionId::SafeMode(mode)).to_vec(),
                    },
                ],
            },
            Submenu {
                title: "Help",
                entries: vec![MenuEntry::Item(ActionId::About)],
            },
        ];

        Self {
            menus,
            actions,
            document_available: false,
            selection_available: false,
            open: None,
            selected: 0,
        }
    }

    pub fn menus(&self) -> &[Submenu] {
        &self.menus
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }

    fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions.iter_mut().find(|action| action.id == id)
    }

    pub fn is_sensitive(&self, id: ActionId) -> bool {
        self.action(id).is_some_and(|action| match action.group {
            ActionGroup::Default => true,
            ActionGroup::Document => self.document_available,
            ActionGroup::Selection => self.selection_available,
        })
    }

    pub fn is_active(&self, id: ActionId) -> bool {
        self.action(id).is_some_and(Action::is_active)
    }

    pub const fn set_document_available(&mut self, available: bool) {
        self.document_available = available;
    }

    pub const fn set_selection_available(&mut self, available: bool) {
        self.selection_available = available;
    }

    pub const fn document_available(&self) -> bool {
        self.document_available
    }

    /// Activate `id` as a user would from the menu or an accelerator.
    ///
    /// Returns the action to dispatch, or `None` when the action is
    /// insensitive or (for radio items) already active.
    pub fn activate(&mut self, id: ActionId) -> Option<ActionId> {
        if !self.is_sensitive(id) {
            return None;
        }
        let kind = self.action(id)?.kind;
        match kind {
            ActionKind::Plain => Some(id),
            ActionKind::Toggle => {
                let action = self.action_mut(id)?;
                action.active = !action.active;
                Some(id)
            }
            ActionKind::Radio(_) => self.select_radio(id).then_some(id),
        }
    }

    /// Make `id` the active member of its radio group.
    fn select_radio(&mut self, id: ActionId) -> bool {
        let Some(ActionKind::Radio(group)) = self.action(id).map(|action| action.kind) else {
            return false;
        };
        if self.is_active(id) {
            return false;
        }
        for action in &mut self.actions {
            if action.kind == ActionKind::Radio(group) {
                action.active = action.id == id;
            }
        }
        true
    }

    fn set_toggle(&mut self, id: ActionId, active: bool) -> bool {
        match self.action_mut(id) {
            Some(action) if action.active != active => {
                action.active = active;
                true
            }
            _ => false,
        }
    }

    // The setters below return whether the state changed, so the caller can
    // react the way it would to an activation.

    pub fn set_view_source(&mut self, view_source: bool) -> bool {
        self.set_toggle(ActionId::ViewSource, view_source)
    }

    pub fn set_enable_attributes(&mut self, enable_attributes: bool) -> bool {
        self.set_toggle(ActionId::EnableAttributes, enable_attributes)
    }

    pub fn set_smart_emphasis(&mut self, smart_emphasis: bool) -> bool {
        self.set_toggle(ActionId::SmartEmphasis, smart_emphasis)
    }

    pub fn set_lazy_ol(&mut self, lazy_ol: bool) -> bool {
        self.set_toggle(ActionId::LazyOl, lazy_ol)
    }

    pub fn set_output_format(&mut self, format: OutputFormat) -> bool {
        self.select_radio(ActionId::OutputFormat(format))
    }

    pub fn set_safe_mode(&mut self, mode: SafeMode) -> bool {
        self.select_radio(ActionId::SafeMode(mode))
    }

    /// The active output format.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.actions.iter().find_map(|action| match action.id {
            ActionId::OutputFormat(format) if action.active => Some(format),
            _ => None,
        })
    }

    /// The active safe mode.
    pub fn safe_mode(&self) -> Option<SafeMode> {
        self.actions.iter().find_map(|action| match action.id {
            ActionId::SafeMode(mode) if action.active => Some(mode),
            _ => None,
        })
    }

    /// The action bound to `key`, sensitive or not.
    pub fn action_for_key(&self, key: &KeyEvent) -> Option<ActionId> {
        self.actions
            .iter()
            .find(|action| action.accel.is_some_and(|accel| accel.matches(key)))
            .map(|action| action.id)
    }

    // Dropdown navigation

    /// Index of the open dropdown, if any.
    pub const fn open_menu(&self) -> Option<usize> {
        self.open
    }

    /// Index into [`Menu::rows`] of the highlighted row.
    pub const fn selected_row(&self) -> usize {
        self.selected
    }

    /// Rows of the dropdown at `index`.
    pub fn rows(&self, index: usize) -> Vec<MenuRow> {
        let Some(menu) = self.menus.get(index) else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for entry in &menu.entries {
            match entry {
                MenuEntry::Item(id) => rows.push(MenuRow::Item {
                    id: *id,
                    nested: false,
                }),
                MenuEntry::Separator => rows.push(MenuRow::Separator),
                MenuEntry::Submenu { label, items } => {
                    rows.push(MenuRow::Label(label));
                    rows.extend(items.iter().map(|id| MenuRow::Item {
                        id: *id,
                        nested: true,
                    }));
                }
            }
        }
        rows
    }

    fn is_selectable(&self, row: MenuRow) -> bool {
        matches!(row, MenuRow::Item { id, .. } if self.is_sensitive(id))
    }

    /// Open the dropdown at `index` with its first usable row highlighted.
    pub fn open_at(&mut self, index: usize) {
        if index >= self.menus.len() {
            return;
        }
        self.open = Some(index);
        let rows = self.rows(index);
        self.selected = rows
            .iter()
            .position(|row| self.is_selectable(*row))
            .unwrap_or(0);
    }

    pub const fn close(&mut self) {
        self.open = None;
        self.selected = 0;
    }

    pub fn next_menu(&mut self) {
        if let Some(open) = self.open {
            self.open_at((open + 1) % self.menus.len());
        }
    }

    pub fn prev_menu(&mut self) {
        if let Some(open) = self.open {
            self.open_at((open + self.menus.len() - 1) % self.menus.len());
        }
    }

    pub fn select_next(&mut self) {
        self.step_selection(true);
    }

    pub fn select_prev(&mut self) {
        self.step_selection(false);
    }

    fn step_selection(&mut self, forward: bool) {
        let Some(open) = self.open else {
            return;
        };
        let rows = self.rows(open);
        let len = rows.len();
        if len == 0 {
            return;
        }
        let mut idx = self.selected;
        for _ in 0..len {
            idx = if forward {
                (idx + 1) % len
            } else {
                (idx + len - 1) % len
            };
            if self.is_selectable(rows[idx]) {
                self.selected = idx;
                return;
            }
        }
    }

    /// Highlight row `row` of the open dropdown if it can be chosen.
    pub fn hover_row(&mut self, row: usize) {
        let Some(open) = self.open else {
            return;
        };
        if self
            .rows(open)
            .get(row)
            .is_some_and(|r| self.is_selectable(*r))
        {
            self.selected = row;
        }
    }

    /// The highlighted action of the open dropdown, if it is usable.
    pub fn highlighted(&self) -> Option<ActionId> {
        let open = self.open?;
        match self.rows(open).get(self.selected) {
            Some(MenuRow::Item { id, .. }) if self.is_sensitive(*id) => Some(*id),
            _ => None,
        }
    }
}
