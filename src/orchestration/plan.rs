//! Search plan - the fixed ordered list of remote steps

use anyhow::Result;
use std::time::Duration;

use crate::search::SearchRequest;

/// Flight site the agent drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteTarget {
    #[default]
    GoogleFlights,
    Kayak,
    Skyscanner,
}

impl SiteTarget {
    /// Configuration name of the site
    pub fn name(&self) -> &str {
        match self {
            Self::GoogleFlights => "google_flights",
            Self::Kayak => "kayak",
            Self::Skyscanner => "skyscanner",
        }
    }

    /// Human-readable site name used in instructions and reports
    pub fn display_name(&self) -> &str {
        match self {
            Self::GoogleFlights => "Google Flights",
            Self::Kayak => "Kayak",
            Self::Skyscanner => "Skyscanner",
        }
    }

    /// Page the plan starts from
    pub fn start_url(&self) -> &str {
        match self {
            Self::GoogleFlights => "https://www.google.com/travel/flights",
            Self::Kayak => "https://www.kayak.com/flights",
            Self::Skyscanner => "https://www.skyscanner.net/flights",
        }
    }

    fn origin_field(&self) -> &str {
        match self {
            Self::GoogleFlights => "'Where from?'",
            Self::Kayak => "'From?'",
            Self::Skyscanner => "'From'",
        }
    }

    fn destination_field(&self) -> &str {
        match self {
            Self::GoogleFlights => "'Where to?'",
            Self::Kayak => "'To?'",
            Self::Skyscanner => "'To'",
        }
    }
}

impl std::fmt::Display for SiteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SiteTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "google_flights" | "google" => Ok(SiteTarget::GoogleFlights),
            "kayak" => Ok(SiteTarget::Kayak),
            "skyscanner" => Ok(SiteTarget::Skyscanner),
            _ => Err(anyhow::anyhow!("Invalid site: {}", s)),
        }
    }
}

/// How the final step pulls offers out of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Schema-constrained extraction returning typed records
    #[default]
    Structured,
    /// Free-text answer parsed line by line (degraded fallback)
    FreeText,
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMode::Structured => write!(f, "structured"),
            ExtractionMode::FreeText => write!(f, "free_text"),
        }
    }
}

impl std::str::FromStr for ExtractionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "structured" => Ok(ExtractionMode::Structured),
            "free_text" | "text" => Ok(ExtractionMode::FreeText),
            _ => Err(anyhow::anyhow!("Invalid extraction mode: {}", s)),
        }
    }
}

/// Step of the search plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    Navigate,
    FillOrigin,
    SelectOrigin,
    FillDestination,
    SelectDestination,
    SetDepartDate,
    SetReturnDate,
    Submit,
    WaitForResults,
    Extract,
}

impl PlanStep {
    /// All steps in execution order
    pub const ORDER: [PlanStep; 10] = [
        PlanStep::Navigate,
        PlanStep::FillOrigin,
        PlanStep::SelectOrigin,
        PlanStep::FillDestination,
        PlanStep::SelectDestination,
        PlanStep::SetDepartDate,
        PlanStep::SetReturnDate,
        PlanStep::Submit,
        PlanStep::WaitForResults,
        PlanStep::Extract,
    ];

    /// Get the step name used in logs and errors
    pub fn name(&self) -> &str {
        match self {
            Self::Navigate => "navigate",
            Self::FillOrigin => "fill_origin",
            Self::SelectOrigin => "select_origin",
            Self::FillDestination => "fill_destination",
            Self::SelectDestination => "select_destination",
            Self::SetDepartDate => "set_depart_date",
            Self::SetReturnDate => "set_return_date",
            Self::Submit => "submit",
            Self::WaitForResults => "wait_for_results",
            Self::Extract => "extract",
        }
    }
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a planned step asks of the remote agent
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Navigate { url: String },
    Act { instruction: String },
    Wait { condition: String, timeout: Duration },
    ExtractStructured { instruction: String },
    ExtractFreeText { instruction: String },
}

/// A step together with its rendered instruction
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub step: PlanStep,
    pub action: StepAction,
}

/// Ordered plan for one attempt. Every attempt rebuilds it from navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    site: SiteTarget,
    steps: Vec<PlannedStep>,
}

impl SearchPlan {
    /// Render the plan for a request
    pub fn for_request(
        site: SiteTarget,
        request: &SearchRequest,
        mode: ExtractionMode,
        results_timeout: Duration,
    ) -> Self {
        let steps = PlanStep::ORDER
            .iter()
            .map(|step| PlannedStep {
                step: *step,
                action: render_action(*step, site, request, mode, results_timeout),
            })
            .collect();
        Self { site, steps }
    }

    pub fn site(&self) -> SiteTarget {
        self.site
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }
}

fn render_action(
    step: PlanStep,
    site: SiteTarget,
    request: &SearchRequest,
    mode: ExtractionMode,
    results_timeout: Duration,
) -> StepAction {
    let act = |instruction: String| StepAction::Act { instruction };
    match step {
        PlanStep::Navigate => StepAction::Navigate {
            url: site.start_url().to_string(),
        },
        PlanStep::FillOrigin => act(format!(
            "Clear the {} field and type '{}'",
            site.origin_field(),
            request.origin
        )),
        PlanStep::SelectOrigin => act(format!(
            "Select the first airport or city suggestion that matches '{}'",
            request.origin
        )),
        PlanStep::FillDestination => act(format!(
            "Click the {} field and type '{}'",
            site.destination_field(),
            request.destination
        )),
        PlanStep::SelectDestination => act(format!(
            "Select the first airport or city suggestion that matches '{}'",
            request.destination
        )),
        PlanStep::SetDepartDate => act(format!(
            "Open the departure date picker and choose {}",
            request.depart_date
        )),
        PlanStep::SetReturnDate => act(format!(
            "Choose {} as the return date and confirm the date picker",
            request.return_date
        )),
        PlanStep::Submit => act("Click the Search button to search for flights".to_string()),
        PlanStep::WaitForResults => StepAction::Wait {
            condition: format!(
                "Flight results with prices for {} are visible on the {} page",
                request.route(),
                site.display_name()
            ),
            timeout: results_timeout,
        },
        PlanStep::Extract => match mode {
            ExtractionMode::Structured => StepAction::ExtractStructured {
                instruction: format!(
                    "Extract every flight option listed for {}: airline, price with currency \
                     symbol, total duration, number of stops, departure and arrival times",
                    request.route()
                ),
            },
            ExtractionMode::FreeText => StepAction::ExtractFreeText {
                instruction: format!(
                    "List the flight options shown for {}, one per line, as \
                     '<N>. <airline> - <price> - <duration>'. Finish with a line \
                     'CHEAPEST FLIGHT: <airline> - <price> - <duration>'.",
                    request.route()
                ),
            },
        },
    }
}
