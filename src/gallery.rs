use crate::api::Project;

pub const LOAD_FAILED: &str = "Failed to load projects. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// Project list with a technology filter and a selection cursor.
/// The cursor always indexes into the filtered view.
#[derive(Debug, Clone)]
pub struct Gallery {
    projects: Vec<Project>,
    techs: Vec<String>,
    filter: Option<String>,
    selected: usize,
    pub state: LoadState,
}

impl Default for Gallery {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            techs: Vec::new(),
            filter: None,
            selected: 0,
            state: LoadState::Loading,
        }
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        let mut techs: Vec<String> = projects
            .iter()
            .flat_map(|p| p.tech_stack.iter().cloned())
            .collect();
        techs.sort();
        techs.dedup();

        // Drop a filter that no longer matches anything
        if let Some(filter) = &self.filter {
            if !techs.contains(filter) {
                self.filter = None;
            }
        }

        self.projects = projects;
        self.techs = techs;
        self.state = LoadState::Loaded;
        self.clamp_selection();
    }

    pub fn set_failed(&mut self) {
        self.state = LoadState::Failed(LOAD_FAILED.to_string());
    }

    pub fn set_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Every technology used by at least one project, sorted
    pub fn techs(&self) -> &[String] {
        &self.techs
    }

    /// Current filter label, "all" when unfiltered
    pub fn filter_label(&self) -> &str {
        self.filter.as_deref().unwrap_or("all")
    }

    /// all -> first tech -> ... -> last tech -> all
    pub fn cycle_filter(&mut self) {
        self.filter = match &self.filter {
            None => self.techs.first().cloned(),
            Some(current) => {
                let idx = self.techs.iter().position(|t| t == current);
                idx.and_then(|i| self.techs.get(i + 1)).cloned()
            }
        };
        self.selected = 0;
    }

    pub fn filtered(&self) -> Vec<&Project> {
        match &self.filter {
            None => self.projects.iter().collect(),
            Some(tech) => self.projects.iter().filter(|p| p.uses(tech)).collect(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Project> {
        self.filtered().get(self.selected).copied()
    }

    pub fn move_down(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn move_up(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
