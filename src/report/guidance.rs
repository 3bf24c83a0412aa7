//! Central rule-guidance table
//!
//! Maps rule ids (engine rules and custom probes alike) to a category,
//! remediation prose, the WCAG success criterion, and ACT rule bindings.
//! Unknown rule ids fall back to generic technical defaults.

use super::types::WcagLevel;

/// Static guidance for one rule id
#[derive(Debug, Clone, Copy)]
pub struct RuleGuidance {
    pub id: &'static str,
    pub category: &'static str,
    /// What is wrong, in prose
    pub what: &'static str,
    /// How to fix it, in prose
    pub fix: &'static str,
    /// WCAG success criterion, e.g. "1.1.1"
    pub wcag: Option<&'static str>,
    pub level: Option<WcagLevel>,
    /// 6-hex-char ACT rule ids
    pub act: &'static [&'static str],
}

const GENERIC: RuleGuidance = RuleGuidance {
    id: "",
    category: "Technical",
    what: "An accessibility rule reported one or more failing elements on this page.",
    fix: "Review the failing elements against the linked rule documentation and correct the markup.",
    wcag: None,
    level: None,
    act: &[],
};

static TABLE: &[RuleGuidance] = &[
    // Engine rules (axe-core ids)
    RuleGuidance {
        id: "image-alt",
        category: "Graphics",
        what: "Images are missing alternate text, so screen-reader users get no information from them.",
        fix: "Add a descriptive alt attribute to every informative image, or alt=\"\" for purely decorative ones.",
        wcag: Some("1.1.1"),
        level: Some(WcagLevel::A),
        act: &["23a2a8"],
    },
    RuleGuidance {
        id: "input-image-alt",
        category: "Graphics",
        what: "Image buttons have no accessible name.",
        fix: "Add an alt attribute describing the button action to every <input type=\"image\">.",
        wcag: Some("1.1.1"),
        level: Some(WcagLevel::A),
        act: &["59796f"],
    },
    RuleGuidance {
        id: "color-contrast",
        category: "Color & Contrast",
        what: "Text does not have sufficient contrast against its background.",
        fix: "Adjust foreground or background colors until the contrast ratio reaches at least 4.5:1 (3:1 for large text).",
        wcag: Some("1.4.3"),
        level: Some(WcagLevel::AA),
        act: &["afw4f7", "09o5cg"],
    },
    RuleGuidance {
        id: "label",
        category: "Forms",
        what: "Form fields have no programmatically associated label.",
        fix: "Associate a <label for=\"...\"> with each field, or use aria-label / aria-labelledby.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["e086e5"],
    },
    RuleGuidance {
        id: "select-name",
        category: "Forms",
        what: "Select elements have no accessible name.",
        fix: "Label every <select> with a <label> element or an aria-label attribute.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["e086e5"],
    },
    RuleGuidance {
        id: "link-name",
        category: "Navigation",
        what: "Links have no discernible text, so their purpose is unclear to assistive technology.",
        fix: "Give every link visible text, an aria-label, or alt text on its image content.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["c487ae"],
    },
    RuleGuidance {
        id: "button-name",
        category: "Forms",
        what: "Buttons have no discernible text.",
        fix: "Provide visible text, aria-label, or aria-labelledby for every button.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["97a4e1"],
    },
    RuleGuidance {
        id: "html-has-lang",
        category: "Language",
        what: "The page does not declare its language, so screen readers may use the wrong voice.",
        fix: "Add a lang attribute to the <html> element, e.g. <html lang=\"en\">.",
        wcag: Some("3.1.1"),
        level: Some(WcagLevel::A),
        act: &["b5c3f8"],
    },
    RuleGuidance {
        id: "html-lang-valid",
        category: "Language",
        what: "The declared page language is not a valid language tag.",
        fix: "Use a valid BCP 47 tag in the lang attribute, e.g. lang=\"cs\" or lang=\"en-GB\".",
        wcag: Some("3.1.1"),
        level: Some(WcagLevel::A),
        act: &["bf051a"],
    },
    RuleGuidance {
        id: "document-title",
        category: "Document",
        what: "The page has no title, so users cannot identify it in tabs or history.",
        fix: "Add a descriptive <title> element inside <head>.",
        wcag: Some("2.4.2"),
        level: Some(WcagLevel::A),
        act: &["2779a5"],
    },
    RuleGuidance {
        id: "duplicate-id-aria",
        category: "ARIA",
        what: "Elements referenced by ARIA share duplicate ids, breaking the references.",
        fix: "Make every id referenced from aria-labelledby / aria-describedby unique.",
        wcag: Some("4.1.1"),
        level: Some(WcagLevel::A),
        act: &["3ea0c8"],
    },
    RuleGuidance {
        id: "aria-required-attr",
        category: "ARIA",
        what: "Elements with ARIA roles are missing attributes those roles require.",
        fix: "Add the required ARIA attributes for the role, e.g. aria-checked on role=\"checkbox\".",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "aria-valid-attr-value",
        category: "ARIA",
        what: "ARIA attributes have invalid values.",
        fix: "Correct the attribute values to ones allowed by the ARIA specification.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["6a7281"],
    },
    RuleGuidance {
        id: "aria-hidden-focus",
        category: "ARIA",
        what: "Focusable elements are hidden from assistive technology with aria-hidden.",
        fix: "Remove aria-hidden from focusable elements or take them out of the tab order with tabindex=\"-1\".",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["6cfa84"],
    },
    RuleGuidance {
        id: "list",
        category: "Structure",
        what: "List markup contains children that are not list items.",
        fix: "Only place <li>, <script> or <template> elements directly inside <ul> and <ol>.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "listitem",
        category: "Structure",
        what: "List items are used outside of list containers.",
        fix: "Wrap <li> elements in a <ul> or <ol> parent.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "heading-order",
        category: "Structure",
        what: "Heading levels skip, which breaks the document outline.",
        fix: "Increase heading levels one step at a time; do not jump from h2 to h4.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "empty-heading",
        category: "Structure",
        what: "Headings contain no text.",
        fix: "Remove empty heading elements or give them meaningful text.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &["ffd0e9"],
    },
    RuleGuidance {
        id: "frame-title",
        category: "Document",
        what: "Frames have no title describing their content.",
        fix: "Add a title attribute to every <iframe> and <frame>.",
        wcag: Some("4.1.2"),
        level: Some(WcagLevel::A),
        act: &["cae760"],
    },
    RuleGuidance {
        id: "td-headers-attr",
        category: "Tables",
        what: "Table cells reference non-existent header cells.",
        fix: "Point the headers attribute of each <td> at ids of real <th> elements in the same table.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &["a25f45"],
    },
    RuleGuidance {
        id: "th-has-data-cells",
        category: "Tables",
        what: "Table headers describe no data cells.",
        fix: "Ensure every <th> relates to at least one data cell, or convert it to <td>.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &["d0f69e"],
    },
    RuleGuidance {
        id: "meta-refresh",
        category: "Document",
        what: "The page refreshes or redirects itself on a timer.",
        fix: "Remove the <meta http-equiv=\"refresh\"> timeout or let users disable it.",
        wcag: Some("2.2.1"),
        level: Some(WcagLevel::A),
        act: &["bc659a"],
    },
    RuleGuidance {
        id: "region",
        category: "Structure",
        what: "Page content lives outside of landmark regions.",
        fix: "Wrap all content in landmarks such as <main>, <nav>, <header> and <footer>.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "bypass",
        category: "Navigation",
        what: "There is no mechanism to skip repeated blocks of content.",
        fix: "Add a skip link as the first focusable element, pointing at the main content.",
        wcag: Some("2.4.1"),
        level: Some(WcagLevel::A),
        act: &["cf77f2"],
    },
    RuleGuidance {
        id: "tabindex",
        category: "Keyboard",
        what: "Positive tabindex values disrupt the natural tab order.",
        fix: "Use tabindex=\"0\" for focusable elements and rely on DOM order for sequencing.",
        wcag: Some("2.4.3"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    // Custom ACT-style probes
    RuleGuidance {
        id: "focus-order",
        category: "Keyboard",
        what: "Keyboard focus gets trapped, jumps visually backwards, or escapes an open modal dialog.",
        fix: "Keep the tab sequence linear, move focus into opened dialogs, and never trap it inside a widget.",
        wcag: Some("2.4.3"),
        level: Some(WcagLevel::A),
        act: &["e3d6f6"],
    },
    RuleGuidance {
        id: "landmarks",
        category: "Structure",
        what: "Landmark regions are missing or duplicated, so assistive-technology users cannot orient on the page.",
        fix: "Provide exactly one <main>, plus <nav>, <header> and <footer> landmarks where the layout calls for them.",
        wcag: Some("1.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "skip-link",
        category: "Navigation",
        what: "There is no working skip-to-content link for keyboard users.",
        fix: "Add a focusable skip link as the first interactive element and point its href at the main content region.",
        wcag: Some("2.4.1"),
        level: Some(WcagLevel::A),
        act: &["cf77f2"],
    },
    RuleGuidance {
        id: "modal-focus",
        category: "Keyboard",
        what: "Dialogs are missing aria-modal, contain nothing focusable, or offer no close control.",
        fix: "Mark dialogs with aria-modal=\"true\", move focus inside on open, and provide a labelled close button.",
        wcag: Some("2.4.3"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "carousel-autoplay",
        category: "Media",
        what: "A carousel advances automatically and offers no pause or stop control.",
        fix: "Add a visible pause/stop button, or stop auto-advancing entirely.",
        wcag: Some("2.2.2"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "meta-viewport",
        category: "Zoom & Scaling",
        what: "The viewport meta tag prevents users from zooming the page.",
        fix: "Remove user-scalable=no and any maximum-scale below 2 from the viewport meta tag.",
        wcag: Some("1.4.4"),
        level: Some(WcagLevel::AA),
        act: &["b4f0c3"],
    },
    RuleGuidance {
        id: "orientation-lock",
        category: "Zoom & Scaling",
        what: "The page rotates its content with CSS to force a single screen orientation.",
        fix: "Let the layout follow the device orientation instead of counter-rotating the root element.",
        wcag: Some("1.3.4"),
        level: Some(WcagLevel::AA),
        act: &["b33eff"],
    },
    RuleGuidance {
        id: "autoplay-media",
        category: "Media",
        what: "Audio or video plays automatically with sound and no way to stop it quickly.",
        fix: "Start media muted or paused, and expose controls to stop playback within three seconds.",
        wcag: Some("1.4.2"),
        level: Some(WcagLevel::A),
        act: &["80f0bf"],
    },
    RuleGuidance {
        id: "form-errors",
        category: "Forms",
        what: "Forms with required fields expose no region where validation errors would be announced.",
        fix: "Add a live error region (role=\"alert\" or aria-live) or link fields to error text via aria-describedby.",
        wcag: Some("3.3.1"),
        level: Some(WcagLevel::A),
        act: &[],
    },
    RuleGuidance {
        id: "suspicious-alt",
        category: "Graphics",
        what: "Image alt texts look like filenames, placeholders, or redundant phrases instead of descriptions.",
        fix: "Rewrite alt texts to describe the image content or function; drop prefixes like \"image of\".",
        wcag: Some("1.1.1"),
        level: Some(WcagLevel::A),
        act: &["23a2a8"],
    },
];

/// Look up guidance for a rule id, falling back to generic defaults
pub fn guidance_for(rule_id: &str) -> RuleGuidance {
    TABLE
        .iter()
        .find(|g| g.id == rule_id)
        .copied()
        .unwrap_or(GENERIC)
}
