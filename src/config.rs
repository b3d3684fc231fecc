/// Engine-wide settings shared by the frame scheduler and the pipeline owner.
///
/// A configuration is a read-only snapshot: it is handed to each subsystem
/// when it is created and never consulted through a global.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Factor by which frame timestamps are slowed down (1.0 = real time).
    pub time_dilation: f32,
    /// Check that every laid out size satisfies its constraints (debug builds).
    pub debug_check_constraints: bool,
    /// Trace every executed layout.
    pub debug_print_layouts: bool,
    /// Trace every `mark_needs_layout` call.
    pub debug_print_mark_needs_layout: bool,
    /// Trace every `mark_needs_paint` call.
    pub debug_print_mark_needs_paint: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_dilation: 1.0,
            debug_check_constraints: true,
            debug_print_layouts: false,
            debug_print_mark_needs_layout: false,
            debug_print_mark_needs_paint: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_dilation(mut self, time_dilation: f32) -> Self {
        assert!(time_dilation > 0.0, "time dilation must be positive");
        self.time_dilation = time_dilation;
        self
    }

    pub fn debug_check_constraints(mut self, enabled: bool) -> Self {
        self.debug_check_constraints = enabled;
        self
    }

    pub fn debug_print_layouts(mut self, enabled: bool) -> Self {
        self.debug_print_layouts = enabled;
        self
    }

    pub fn debug_print_mark_needs_layout(mut self, enabled: bool) -> Self {
        self.debug_print_mark_needs_layout = enabled;
        self
    }

    pub fn debug_print_mark_needs_paint(mut self, enabled: bool) -> Self {
        self.debug_print_mark_needs_paint = enabled;
        self
    }
}
