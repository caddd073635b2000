use crate::utils::error::{DashError, Result};
use std::fmt;
use std::str::FromStr;

/// Dashboard sections reachable from the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Distribution,
    PortfolioManagement,
    Forecasting,
    PostDeal,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Distribution,
        Section::PortfolioManagement,
        Section::Forecasting,
        Section::PostDeal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Distribution => "Distribution",
            Section::PortfolioManagement => "Portfolio Management",
            Section::Forecasting => "Forecasting",
            Section::PostDeal => "Post Deal",
        }
    }

    pub fn button_label(self) -> String {
        format!("Explore {}", self.label())
    }

    pub fn page_path(self) -> &'static str {
        match self {
            Section::Distribution => "pages/01_Distribution.py",
            Section::PortfolioManagement => "pages/02_Portfolio_Management.py",
            Section::Forecasting => "pages/03_Forecasting.py",
            Section::PostDeal => "pages/04_Post_Deal.py",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Distribution => "distribution",
            Section::PortfolioManagement => "portfolio-management",
            Section::Forecasting => "forecasting",
            Section::PostDeal => "post-deal",
        }
    }

    /// 目前只有 Portfolio Management 有實作
    pub fn is_available(self) -> bool {
        matches!(self, Section::PortfolioManagement)
    }

    pub fn open(self) -> Result<Section> {
        if self.is_available() {
            Ok(self)
        } else {
            Err(DashError::SectionUnavailable {
                section: self.label().to_string(),
            })
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown section '{}'; expected one of: {}",
                    s,
                    Section::ALL.map(|sec| sec.slug()).join(", ")
                )
            })
    }
}

/// Home page grid: two rows of two sections.
pub fn home_layout() -> [[Section; 2]; 2] {
    [
        [Section::Distribution, Section::PortfolioManagement],
        [Section::Forecasting, Section::PostDeal],
    ]
}

/// Views inside the Portfolio Management section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortfolioView {
    #[default]
    Main,
    TotalBook,
}

impl FromStr for PortfolioView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "main" | "overview" => Ok(PortfolioView::Main),
            "total-book" => Ok(PortfolioView::TotalBook),
            other => Err(format!(
                "unknown view '{}'; expected 'main' or 'total-book'",
                other
            )),
        }
    }
}

/// Per-session UI state; starts on the main view.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pm_view: PortfolioView,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> PortfolioView {
        self.pm_view
    }

    pub fn set_view(&mut self, view: PortfolioView) {
        tracing::debug!("Portfolio view: {:?} -> {:?}", self.pm_view, view);
        self.pm_view = view;
    }

    /// "View Total Book"
    pub fn view_total_book(&mut self) {
        self.set_view(PortfolioView::TotalBook);
    }

    /// "Back to Portfolio Overview"
    pub fn back_to_overview(&mut self) {
        self.set_view(PortfolioView::Main);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_layout_and_labels() {
        let layout = home_layout();
        assert_eq!(layout[0][0].button_label(), "Explore Distribution");
        assert_eq!(layout[0][1].page_path(), "pages/02_Portfolio_Management.py");
        assert_eq!(layout[1][1].label(), "Post Deal");
    }

    #[test]
    fn test_only_portfolio_management_opens() {
        assert_eq!(
            Section::PortfolioManagement.open().unwrap(),
            Section::PortfolioManagement
        );
        let err = Section::Forecasting.open().unwrap_err();
        assert_eq!(err.to_string(), "Section 'Forecasting' is not available yet");
    }

    #[test]
    fn test_section_from_str_accepts_labels_and_slugs() {
        assert_eq!("Portfolio Management".parse::<Section>().unwrap(), Section::PortfolioManagement);
        assert_eq!("post_deal".parse::<Section>().unwrap(), Section::PostDeal);
        assert!("pricing".parse::<Section>().is_err());
    }

    #[test]
    fn test_session_view_switching() {
        let mut session = Session::new();
        assert_eq!(session.view(), PortfolioView::Main);
        session.view_total_book();
        assert_eq!(session.view(), PortfolioView::TotalBook);
        session.back_to_overview();
        assert_eq!(session.view(), PortfolioView::Main);
        assert_eq!("total_book".parse::<PortfolioView>().unwrap(), PortfolioView::TotalBook);
    }
}
