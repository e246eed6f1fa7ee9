//! Shell Configuration

/// Shell configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Print the numbered menu before every prompt
    pub show_menu: bool,

    /// Load the demo entries before the first prompt
    pub seed_demo: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            show_menu: true,
            seed_demo: true,
        }
    }
}

impl ShellConfig {
    /// Toggle the menu banner
    pub fn with_menu(mut self, show: bool) -> Self {
        self.show_menu = show;
        self
    }

    /// Toggle demo data seeding
    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed_demo = seed;
        self
    }
}
