//! Page composition: ordered tables, images and charts in one HTML document.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::Dataset;
use crate::error::DatapageError;
use crate::fields::TableFieldArray;
use crate::names::{output_file_stem, validate_name};
use crate::options::{HtmlTableOptions, ResourceMode};
use crate::Result;

use super::chart::{image_to_html, ImageFormat, InteractiveChart, RasterChart, DEFAULT_DPI};
use super::table::dataset_to_html;
use super::templates::{self, COMPOSITE, PAGE, PAGE_STYLE, SECTION};

/// Title, caption and name of a page element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementOptions {
    pub title: Option<String>,
    pub caption: Option<String>,
    /// Identifier restricted to `[0-9A-Za-z_]`; used as DOM id for charts
    pub name: Option<String>,
}

impl ElementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the element heading
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the description below the heading
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Builder: set the element name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

enum ElementContent {
    Html(String),
    Chart(Box<dyn InteractiveChart>),
}

/// One ordered unit of page content.
pub struct PageElement {
    index: usize,
    title: Option<String>,
    caption: Option<String>,
    name: Option<String>,
    content: ElementContent,
    data: Option<Dataset>,
}

/// Data context for the section template
#[derive(Serialize)]
struct SectionContext<'a> {
    title: Option<&'a str>,
    caption: Option<&'a str>,
    object: &'a str,
}

impl PageElement {
    fn new(index: usize, options: ElementOptions, content: ElementContent) -> Result<Self> {
        if let Some(name) = &options.name {
            validate_name(name)?;
        }
        Ok(PageElement {
            index,
            title: options.title,
            caption: options.caption,
            name: options.name,
            content,
            data: None,
        })
    }

    fn with_data(mut self, data: Dataset) -> Self {
        self.data = Some(data);
        self
    }

    /// Position on the page.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Raw data behind a table element, for export.
    pub fn data(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    /// Pre-rendered fragment; `None` for interactive charts, whose markup
    /// only exists once the page is rendered.
    pub fn html_raw(&self) -> Option<&str> {
        match &self.content {
            ElementContent::Html(html) => Some(html),
            ElementContent::Chart(_) => None,
        }
    }

    /// DOM id of the chart placeholder.
    fn target_id(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("datapage-chart-{}", self.index))
    }

    fn render(&self, object: &str) -> Result<String> {
        templates::render(
            SECTION,
            &SectionContext {
                title: self.title(),
                caption: self.caption(),
                object,
            },
        )
    }
}

impl fmt::Debug for PageElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageElement")
            .field("index", &self.index)
            .field("title", &self.title)
            .field("caption", &self.caption)
            .field("name", &self.name)
            .field("html", &self.html_raw())
            .field("data", &self.data.as_ref().map(Dataset::len))
            .finish()
    }
}

/// Data context for the composite template
#[derive(Serialize)]
struct CompositeContext<'a> {
    page_title: Option<&'a str>,
    caption: Option<&'a str>,
    elements: Vec<String>,
}

/// Data context for the page skeleton
#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    style: &'a str,
    header_elements: Vec<String>,
    body: String,
}

/// A static HTML report made of tables, images and charts.
///
/// Every element receives the next index when it is added; the page shows
/// elements in that order regardless of their kind.
#[derive(Debug, Default)]
pub struct CompositePage {
    title: Option<String>,
    caption: Option<String>,
    resource_mode: ResourceMode,
    tables: Vec<PageElement>,
    images: Vec<PageElement>,
    charts: Vec<PageElement>,
    index: usize,
}

impl CompositePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the page title (also the default output name)
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the page description
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Builder: choose CDN or inline chart resources
    pub fn resource_mode(mut self, mode: ResourceMode) -> Self {
        self.resource_mode = mode;
        self
    }

    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn next_index(&mut self) -> usize {
        self.index += 1;
        self.index
    }

    /// Add a raw dataset as a table.
    pub fn add_table(
        &mut self,
        data: &Dataset,
        options: HtmlTableOptions,
        element: ElementOptions,
    ) -> Result<()> {
        let html = dataset_to_html(data, options)?;
        let index = self.next_index();
        let table = PageElement::new(index, element, ElementContent::Html(html))?
            .with_data(data.clone());
        self.tables.push(table);
        Ok(())
    }

    /// Add a table from markup rendered elsewhere.
    pub fn add_table_html(&mut self, html: impl Into<String>, element: ElementOptions) -> Result<()> {
        let index = self.next_index();
        let table = PageElement::new(index, element, ElementContent::Html(html.into()))?;
        self.tables.push(table);
        Ok(())
    }

    /// Add a table projected through field descriptors.
    ///
    /// The element keeps `df_pretty` as its raw data.
    pub fn add_table_from_fields(
        &mut self,
        fields: &TableFieldArray,
        element: ElementOptions,
    ) -> Result<()> {
        let html = fields.table_html()?.to_string();
        let pretty = fields.df_pretty()?.clone();
        let index = self.next_index();
        let table =
            PageElement::new(index, element, ElementContent::Html(html))?.with_data(pretty);
        self.tables.push(table);
        Ok(())
    }

    /// Add an already encoded image.
    pub fn add_image(
        &mut self,
        bytes: &[u8],
        format: ImageFormat,
        element: ElementOptions,
    ) -> Result<()> {
        let index = self.next_index();
        let image = PageElement::new(
            index,
            element,
            ElementContent::Html(image_to_html(bytes, format)),
        )?;
        self.images.push(image);
        Ok(())
    }

    /// Add a static chart, rendered to PNG at `dpi` (75 by default).
    pub fn add_raster_chart(
        &mut self,
        chart: &dyn RasterChart,
        dpi: Option<u32>,
        element: ElementOptions,
    ) -> Result<()> {
        let png = chart.render_png(dpi.unwrap_or(DEFAULT_DPI))?;
        self.add_image(&png, ImageFormat::Png, element)
    }

    /// Add an interactive chart.
    pub fn add_chart(
        &mut self,
        chart: impl InteractiveChart + 'static,
        element: ElementOptions,
    ) -> Result<()> {
        let index = self.next_index();
        let chart = PageElement::new(index, element, ElementContent::Chart(Box::new(chart)))?;
        self.charts.push(chart);
        Ok(())
    }

    /// All elements in page order.
    pub fn page_content(&self) -> Vec<&PageElement> {
        let mut content: Vec<&PageElement> = self
            .tables
            .iter()
            .chain(&self.images)
            .chain(&self.charts)
            .collect();
        content.sort_by_key(|element| element.index);
        content
    }

    /// Render the complete document.
    pub fn html(&self) -> Result<String> {
        let mut header_elements: Vec<String> = Vec::new();
        for element in &self.charts {
            if let ElementContent::Chart(chart) = &element.content {
                for resource in chart.resources(self.resource_mode) {
                    if !header_elements.contains(&resource) {
                        header_elements.push(resource);
                    }
                }
            }
        }

        let mut scripts = Vec::new();
        let mut sections = Vec::new();
        for element in self.page_content() {
            let section = match &element.content {
                ElementContent::Html(html) => element.render(html)?,
                ElementContent::Chart(chart) => {
                    let embed = chart.embed(&element.target_id())?;
                    scripts.push(embed.script);
                    element.render(&embed.div)?
                }
            };
            sections.push(section);
        }
        header_elements.extend(scripts);

        let body = templates::render(
            COMPOSITE,
            &CompositeContext {
                page_title: self.title.as_deref(),
                caption: self.caption.as_deref(),
                elements: sections,
            },
        )?;

        templates::render(
            PAGE,
            &PageContext {
                title: self.title.as_deref().unwrap_or_default(),
                style: PAGE_STYLE,
                header_elements,
                body,
            },
        )
    }

    /// Write the page to `<name>.html` in the current directory.
    ///
    /// See [`publish_in`](Self::publish_in).
    pub fn publish(&self, name: Option<&str>, overwrite: bool) -> Result<PathBuf> {
        self.publish_in(std::env::current_dir()?, name, overwrite)
    }

    /// Write the page to `<name>.html` in `dir` and return the absolute path.
    ///
    /// The name defaults to the page title and is sanitized first: whitespace
    /// becomes `_`, other characters outside `[0-9A-Za-z\-_.]` are dropped.
    /// An existing file is only replaced when `overwrite` is set.
    pub fn publish_in(
        &self,
        dir: impl AsRef<Path>,
        name: Option<&str>,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let name = name.or(self.title.as_deref()).unwrap_or_default();
        let stem = output_file_stem(name)?;
        let path = std::path::absolute(dir.as_ref().join(format!("{}.html", stem)))?;

        if path.exists() && !overwrite {
            return Err(DatapageError::FileExists(path));
        }

        let html = self.html()?;
        fs::write(&path, html).map_err(|source| DatapageError::FileWrite {
            path: path.clone(),
            source,
        })?;
        log::info!("access output via: {}", access_url(&path));
        Ok(path)
    }
}

/// `file://` URL of a published page.
pub fn access_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
