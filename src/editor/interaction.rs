/// Which built-in map gestures are live. Dialogs switch all of them off so
/// nothing fires on the map behind them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapInteraction {
    pub dragging: bool,
    pub touch_zoom: bool,
    pub double_click_zoom: bool,
    pub scroll_zoom: bool,
    modal_open: bool,
}

impl Default for MapInteraction {
    fn default() -> Self {
        Self {
            dragging: true,
            touch_zoom: true,
            double_click_zoom: true,
            scroll_zoom: true,
            modal_open: false,
        }
    }
}

impl MapInteraction {
    pub fn set_modal_open(&mut self, open: bool) {
        if self.modal_open == open {
            return;
        }
        self.modal_open = open;
        let enabled = !open;
        self.dragging = enabled;
        self.touch_zoom = enabled;
        self.double_click_zoom = enabled;
        self.scroll_zoom = enabled;
        tracing::debug!(modal_open = open, "map interaction toggled");
    }

    /// Map clicks are routed to the editor only with no dialog open.
    pub fn accepts_clicks(&self) -> bool {
        !self.modal_open
    }
}
