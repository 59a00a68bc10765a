// Destination grid rendering
// Surfaces are opaque sinks: every render writes a full replacement payload,
// never an append, so re-rendering the same list is idempotent

use crate::models::Destination;

pub trait RenderSurface {
    fn replace(&mut self, payload: String);
}

// Simplest surface: a string buffer, good enough for tests and for embedding
// into whatever shell hosts the page
#[derive(Debug, Default)]
pub struct StringSurface {
    content: String,
}

impl StringSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl RenderSurface for StringSurface {
    fn replace(&mut self, payload: String) {
        self.content = payload;
    }
}

const NO_RESULTS: &str = "<div class=\"no-results\">\
<p>No destinations found</p>\
<p>Try adjusting your search or filters</p>\
</div>";

#[derive(Debug, Default)]
pub struct DestinationGrid;

impl DestinationGrid {
    // Redraw the grid and the results count from an already filtered, already
    // ordered list. An empty list gets a distinct no-results state rather
    // than an empty container.
    pub fn render(
        &self,
        grid: &mut dyn RenderSurface,
        results_count: &mut dyn RenderSurface,
        destinations: &[Destination],
    ) {
        results_count.replace(results_count_line(destinations.len()));

        if destinations.is_empty() {
            grid.replace(NO_RESULTS.to_string());
            return;
        }

        let mut payload = String::from("<div class=\"destination-cards\">");
        for dest in destinations {
            payload.push_str(&destination_card(dest));
        }
        payload.push_str("</div>");

        grid.replace(payload);
    }
}

pub fn results_count_line(count: usize) -> String {
    format!(
        "Showing {} destination{}",
        count,
        if count == 1 { "" } else { "s" }
    )
}

pub fn destination_card(dest: &Destination) -> String {
    let mut card = String::new();

    card.push_str(&format!(
        "<article class=\"destination-card\" id=\"{}\">",
        escape_html(&dest.id)
    ));

    if let Some(rating) = dest.rating {
        card.push_str(&format!("<span class=\"rating\">{:.1}</span>", rating));
    }
    if let Some(tag) = dest.category.first() {
        card.push_str(&format!("<span class=\"category\">{}</span>", escape_html(tag)));
    }

    card.push_str(&format!("<h3>{}</h3>", escape_html(&dest.name_en)));
    card.push_str(&format!("<p class=\"name-th\">{}</p>", escape_html(&dest.name_th)));
    card.push_str(&format!(
        "<p>{}</p>",
        escape_html(&truncate_text(&dest.description, 150))
    ));

    if let Some(hours) = &dest.opening_hours {
        card.push_str(&format!("<p class=\"hours\">{}</p>", escape_html(hours)));
    }
    if let Some(fee) = &dest.entrance_fee {
        if fee.thai > 0.0 || fee.foreigner > 0.0 {
            card.push_str(&format!(
                "<p class=\"fee\">Thai: ฿{} | Foreigner: ฿{}</p>",
                fee.thai, fee.foreigner
            ));
        }
    }
    if let Some(duration) = &dest.average_duration {
        card.push_str(&format!("<p class=\"duration\">{}</p>", escape_html(duration)));
    }

    if !dest.facilities.is_empty() {
        card.push_str("<ul class=\"facilities\">");
        for facility in dest.facilities.iter().take(5) {
            card.push_str(&format!("<li>{}</li>", escape_html(facility)));
        }
        card.push_str("</ul>");
    }

    if let Some(contact) = &dest.contact {
        if let Some(website) = &contact.website {
            card.push_str(&format!(
                "<a class=\"website\" href=\"{}\">Website</a>",
                escape_html(website)
            ));
        }
        if let Some(map_url) = &contact.google_maps_url {
            card.push_str(&format!(
                "<a class=\"map\" href=\"{}\">Map</a>",
                escape_html(map_url)
            ));
        }
    }

    card.push_str("</article>");
    card
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// Character-based so multi-byte Thai text never splits mid-glyph
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contact;

    fn sample(id: &str, name: &str) -> Destination {
        Destination {
            id: id.to_string(),
            province_id: "bangkok".to_string(),
            name_en: name.to_string(),
            name_th: "ชื่อ".to_string(),
            description: "Somewhere pleasant".to_string(),
            category: vec!["temple".to_string()],
            is_open: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_replaces_instead_of_appending() {
        let grid = DestinationGrid;
        let mut surface = StringSurface::new();
        let mut count = StringSurface::new();

        grid.render(&mut surface, &mut count, &[sample("a", "Alpha"), sample("b", "Beta")]);
        assert_eq!(surface.content().matches("<article").count(), 2);

        grid.render(&mut surface, &mut count, &[sample("a", "Alpha")]);
        assert_eq!(
            surface.content().matches("<article").count(),
            1,
            "second render fully replaces the first"
        );
        assert_eq!(count.content(), "Showing 1 destination");
    }

    #[test]
    fn test_render_is_idempotent() {
        let grid = DestinationGrid;
        let destinations = [sample("a", "Alpha"), sample("b", "Beta")];

        let mut first = StringSurface::new();
        let mut first_count = StringSurface::new();
        grid.render(&mut first, &mut first_count, &destinations);

        let mut second = StringSurface::new();
        let mut second_count = StringSurface::new();
        grid.render(&mut second, &mut second_count, &destinations);
        grid.render(&mut second, &mut second_count, &destinations);

        assert_eq!(first.content(), second.content());
        assert_eq!(first_count.content(), second_count.content());
    }

    #[test]
    fn test_empty_list_renders_distinct_no_results_state() {
        let grid = DestinationGrid;
        let mut surface = StringSurface::new();
        let mut count = StringSurface::new();

        grid.render(&mut surface, &mut count, &[]);

        assert!(!surface.content().is_empty(), "never an empty container");
        assert!(surface.content().contains("No destinations found"));
        assert_eq!(count.content(), "Showing 0 destinations");
    }

    #[test]
    fn test_card_includes_optional_sections_when_present() {
        let mut dest = sample("wat-pho", "Wat Pho");
        dest.rating = Some(4.6);
        dest.opening_hours = Some("08:00 - 18:30".to_string());
        dest.facilities = vec![
            "parking".to_string(),
            "restrooms".to_string(),
            "cafe".to_string(),
            "gift shop".to_string(),
            "wheelchair access".to_string(),
            "lockers".to_string(),
        ];
        dest.contact = Some(Contact {
            website: Some("https://watpho.example".to_string()),
            google_maps_url: None,
        });

        let card = destination_card(&dest);
        assert!(card.contains("4.6"));
        assert!(card.contains("08:00 - 18:30"));
        assert_eq!(card.matches("<li>").count(), 5, "at most five facilities shown");
        assert!(card.contains("https://watpho.example"));
        assert!(!card.contains("class=\"map\""));
    }

    #[test]
    fn test_card_escapes_markup_in_text() {
        let mut dest = sample("x", "Rooftop <Bar> & Grill");
        dest.description = "\"Best\" views".to_string();

        let card = destination_card(&dest);
        assert!(card.contains("Rooftop &lt;Bar&gt; &amp; Grill"));
        assert!(card.contains("&quot;Best&quot; views"));
        assert!(!card.contains("<Bar>"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let thai = "วัดพระศรีรัตนศาสดาราม";
        let truncated = truncate_text(thai, 5);
        assert_eq!(truncated.chars().count(), 8, "five kept chars plus ellipsis dots");
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_text("short", 150), "short");
    }
}
