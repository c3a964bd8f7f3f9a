use crate::line::Line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: Line,
    pub indent_level: usize,
    pub content: Vec<(Line, usize)>,
}

impl Section {
    fn new(heading: Line) -> Self {
        Self {
            indent_level: heading.indent,
            heading,
            content: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        std::iter::once(&self.heading).chain(self.content.iter().map(|(line, _)| line))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputUnit {
    Passthrough(Line),
    Section(Section),
}

/// Groups classified lines into sections. Holds at most one open section.
#[derive(Debug, Default)]
pub struct SectionBuilder {
    units: Vec<OutputUnit>,
    current: Option<Section>,
}

impl SectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_indent(&self) -> Option<usize> {
        self.current.as_ref().map(|section| section.indent_level)
    }

    pub fn push(&mut self, line: Line) {
        if line.is_heading() {
            self.exit_section();
            self.current = Some(Section::new(line));
            return;
        }

        match self.current_indent() {
            Some(floor) if line.indent > floor => {
                if let Some(section) = self.current.as_mut() {
                    let indent = line.indent;
                    section.content.push((line, indent));
                }
            }
            Some(_) => {
                self.exit_section();
                self.units.push(OutputUnit::Passthrough(line));
            }
            None => self.units.push(OutputUnit::Passthrough(line)),
        }
    }

    pub fn finalize(mut self) -> Vec<OutputUnit> {
        self.exit_section();
        self.units
    }

    fn exit_section(&mut self) {
        if let Some(section) = self.current.take() {
            self.units.push(OutputUnit::Section(section));
        }
    }
}

pub fn build_sections<I>(lines: I) -> Vec<OutputUnit>
where
    I: IntoIterator<Item = Line>,
{
    let mut builder = SectionBuilder::new();
    for line in lines {
        builder.push(line);
    }
    builder.finalize()
}
