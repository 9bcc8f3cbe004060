use formats::{FlyerParams, ResolvedLink, Transport};

use crate::symbology::{FlyerStyle, LabelStyle, MarkerStyle};

/// Which flight arc the pointer is over, if any.
///
/// Styles are derived from this value on every redraw, so leaving a hover
/// is simply rendering with `Highlight::None` again.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    None,
    Link(usize),
}

impl Highlight {
    pub fn resolve<'a>(
        self,
        links: &'a [ResolvedLink],
        flyer: &'a FlyerParams,
    ) -> HighlightStyles<'a> {
        let link = match self {
            Highlight::None => None,
            Highlight::Link(i) => links.get(i),
        };
        HighlightStyles { link, flyer }
    }
}

/// Style lookup for one redraw.
#[derive(Debug, Copy, Clone)]
pub struct HighlightStyles<'a> {
    link: Option<&'a ResolvedLink>,
    flyer: &'a FlyerParams,
}

impl HighlightStyles<'_> {
    pub fn is_active(&self) -> bool {
        self.link.is_some()
    }

    pub fn flyer(&self, link: &ResolvedLink) -> FlyerStyle {
        match self.link {
            None => FlyerStyle::default(),
            Some(hovered) if hovered.key() == link.key() => FlyerStyle {
                stroke_width: 3.0,
                stroke: Some(self.transport_color(&hovered.transport).to_string()),
            },
            Some(_) => FlyerStyle {
                stroke_width: 1.0,
                stroke: None,
            },
        }
    }

    pub fn label(&self, place: &str) -> LabelStyle {
        match self.link {
            None => LabelStyle::default(),
            Some(hovered) if hovered.touches(place) => LabelStyle {
                visible: true,
                font_size_px: 10.0,
                font_weight: 900,
            },
            Some(_) => LabelStyle {
                visible: false,
                font_size_px: 3.0,
                font_weight: 300,
            },
        }
    }

    pub fn marker(&self, place: &str) -> MarkerStyle {
        match self.link {
            None => MarkerStyle::default(),
            Some(hovered) if hovered.touches(place) => MarkerStyle {
                visible: true,
                fill: Some(self.flyer.endpoint_color.clone()),
            },
            Some(_) => MarkerStyle {
                visible: false,
                fill: None,
            },
        }
    }

    fn transport_color(&self, transport: &Transport) -> &str {
        match transport {
            Transport::Plane => &self.flyer.plane_color,
            Transport::Other(_) => &self.flyer.other_color,
        }
    }
}
