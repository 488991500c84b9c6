// crates/trellis-layout/src/flexbox.rs

use tracing::{debug, trace, warn};
use trellis_core::{Align, Direction, Edge, Edges, Overflow, Style, Wrap};

use crate::absolute::AbsoluteContainer;
use crate::cache::{CacheKey, CacheStats};
use crate::resolve::{self, Axes, FlexItem};
use crate::rounding;
use crate::tree::NodeFlags;
use crate::{
    AxisBounds, ConstraintBox, LayoutError, LayoutResult, LayoutTree, MeasureInput, MeasureMode,
    MeasureProvider, NoMeasure, NodeId, Result, Size,
};

/// Constraints for laying out one node. Available sizes describe the
/// node's border box; its own margins are already taken out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutInput {
    pub available_width: Option<f32>,
    pub width_mode: MeasureMode,
    pub available_height: Option<f32>,
    pub height_mode: MeasureMode,
    /// Parent's inner size, the reference for percentages.
    pub owner_width: Option<f32>,
    pub owner_height: Option<f32>,
    pub parent_direction: Direction,
    /// Position children and write results, rather than only report a size.
    pub perform_layout: bool,
}

type AxisInput = (Option<f32>, MeasureMode);

impl LayoutInput {
    pub fn new(
        width: AxisInput,
        height: AxisInput,
        owner: (Option<f32>, Option<f32>),
        parent_direction: Direction,
        perform_layout: bool,
    ) -> Self {
        let (available_width, width_mode) = normalize_axis(width);
        let (available_height, height_mode) = normalize_axis(height);
        Self {
            available_width,
            width_mode,
            available_height,
            height_mode,
            owner_width: owner.0,
            owner_height: owner.1,
            parent_direction,
            perform_layout,
        }
    }

    fn axis(&self, row: bool) -> AxisInput {
        if row {
            (self.available_width, self.width_mode)
        } else {
            (self.available_height, self.height_mode)
        }
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey {
            available_width: self.available_width,
            width_mode: self.width_mode,
            available_height: self.available_height,
            height_mode: self.height_mode,
            owner_width: self.owner_width,
            owner_height: self.owner_height,
            parent_direction: self.parent_direction,
        }
    }
}

/// An axis without a finite size is unconstrained, whatever mode was asked.
fn normalize_axis((size, mode): AxisInput) -> AxisInput {
    match (size, mode) {
        (Some(size), MeasureMode::Exactly | MeasureMode::AtMost) if size.is_finite() => {
            (Some(size.max(0.0)), mode)
        }
        _ => (None, MeasureMode::Undefined),
    }
}

/// Resolves an edge set to physical left, top, right, bottom values.
pub(crate) fn resolve_edges(edges: &Edges, direction: Direction, reference: Option<f32>) -> [f32; 4] {
    Edge::PHYSICAL.map(|edge| edges.resolve(edge, direction).resolve_or_zero(reference))
}

fn padding_and_border(style: &Style, direction: Direction, reference: Option<f32>) -> ([f32; 4], [f32; 4]) {
    let padding = resolve_edges(&style.padding, direction, reference).map(|v| v.max(0.0));
    // Border widths never resolve percentages.
    let border = resolve_edges(&style.border, direction, None).map(|v| v.max(0.0));
    (padding, border)
}

pub(crate) fn sum_edges(a: &[f32; 4], b: &[f32; 4]) -> [f32; 4] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]]
}

fn horizontal(edges: &[f32; 4]) -> f32 {
    edges[Edge::Left.index()] + edges[Edge::Right.index()]
}

fn vertical(edges: &[f32; 4]) -> f32 {
    edges[Edge::Top.index()] + edges[Edge::Bottom.index()]
}

/// Offset of a box from the physical start of its container, given its
/// offset from the axis' leading edge.
pub(crate) fn physical_offset(lead: Edge, offset: f32, size: f32, container: f32) -> f32 {
    match lead {
        Edge::Left | Edge::Top => offset,
        _ => container - offset - size,
    }
}

/// Inner (content box) size available to children.
fn inner_size(available: Option<f32>, padding_border: f32, bounds: &AxisBounds) -> Option<f32> {
    available.map(|size| {
        let inner = size - padding_border;
        inner
            .min(bounds.max - padding_border)
            .max(bounds.min - padding_border)
            .max(0.0)
    })
}

/// Shift of a relative child from its `position` offsets; left and top win.
fn relative_offset(style: &Style, direction: Direction, width: Option<f32>, height: Option<f32>) -> (f32, f32) {
    let offset = |edge: Edge, reference: Option<f32>| style.position.resolve(edge, direction).resolve(reference);
    let dx = offset(Edge::Left, width)
        .or_else(|| offset(Edge::Right, width).map(|v| -v))
        .unwrap_or(0.0);
    let dy = offset(Edge::Top, height)
        .or_else(|| offset(Edge::Bottom, height).map(|v| -v))
        .unwrap_or(0.0);
    (dx, dy)
}

/// What a container knows while sizing its flow children.
#[derive(Debug, Clone, Copy)]
struct FlexContext {
    direction: Direction,
    axes: Axes,
    inner_width: Option<f32>,
    inner_height: Option<f32>,
    width_mode: MeasureMode,
    height_mode: MeasureMode,
    overflow: Overflow,
    single_line: bool,
}

impl FlexContext {
    fn inner(&self, row: bool) -> Option<f32> {
        if row { self.inner_width } else { self.inner_height }
    }

    fn mode(&self, row: bool) -> MeasureMode {
        if row { self.width_mode } else { self.height_mode }
    }

    fn owner(&self) -> (Option<f32>, Option<f32>) {
        (self.inner_width, self.inner_height)
    }

    fn stretches(&self, item: &FlexItem) -> bool {
        item.align == Align::Stretch && !item.has_cross_auto_margin(&self.axes)
    }
}

impl LayoutTree {
    /// Lays out the subtree under `root`. A dimension passed as `None` is
    /// unconstrained. Measured leaves fail the pass; use
    /// [`LayoutTree::calculate_layout_with_measure`] for trees that have them.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        width: Option<f32>,
        height: Option<f32>,
        direction: Direction,
    ) -> Result<()> {
        self.calculate_layout_with_measure(root, width, height, direction, &mut NoMeasure)
    }

    /// Lays out the subtree under `root`, sizing measured leaves with
    /// `measure`. On failure every result and cache entry in the subtree is
    /// reset and the subtree is left dirty.
    pub fn calculate_layout_with_measure(
        &mut self,
        root: NodeId,
        width: Option<f32>,
        height: Option<f32>,
        direction: Direction,
        measure: &mut dyn MeasureProvider,
    ) -> Result<()> {
        self.stats = CacheStats::default();
        debug!("Calculating layout for {} within {:?} x {:?}", root, width, height);

        match self.layout_root(root, width, height, direction, measure) {
            Ok(()) => {
                debug!(
                    "Layout complete: {} cache hits, {} misses, {} measure calls",
                    self.stats.hits, self.stats.misses, self.stats.measure_calls
                );
                Ok(())
            }
            Err(err) => {
                warn!("Layout of {} failed: {}", root, err);
                self.reset_subtree(root);
                Err(err)
            }
        }
    }

    fn layout_root(
        &mut self,
        root: NodeId,
        width: Option<f32>,
        height: Option<f32>,
        direction: Direction,
        measure: &mut dyn MeasureProvider,
    ) -> Result<()> {
        // An infinite available size means the same as none.
        let width = width.filter(|w| w.is_finite());
        let height = height.filter(|h| h.is_finite());
        let style = self.node(root)?.style.clone();
        let root_direction = style.direction.resolve(direction);
        let margin = resolve_edges(&style.margin, root_direction, width);

        let root_axis = |dimension: trellis_core::StyleValue,
                         max: trellis_core::StyleValue,
                         available: Option<f32>,
                         margin: f32| {
            if let Some(size) = dimension.resolve(available) {
                (Some(size), MeasureMode::Exactly)
            } else if let Some(max) = max.resolve(available) {
                (Some(max), MeasureMode::AtMost)
            } else if let Some(available) = available {
                (Some(available - margin), MeasureMode::Exactly)
            } else {
                (None, MeasureMode::Undefined)
            }
        };
        let input = LayoutInput::new(
            root_axis(style.width, style.max_width, width, horizontal(&margin)),
            root_axis(style.height, style.max_height, height, vertical(&margin)),
            (width, height),
            direction,
            true,
        );
        self.layout_node(root, input, measure)?;

        let (dx, dy) = relative_offset(&style, root_direction, width, height);
        let node = self.node_mut(root)?;
        node.unrounded.left = margin[Edge::Left.index()] + dx;
        node.unrounded.top = margin[Edge::Top.index()] + dy;

        rounding::round_layout(self, root)
    }

    /// Cached entry point for one node.
    pub(crate) fn layout_node(
        &mut self,
        id: NodeId,
        input: LayoutInput,
        measure: &mut dyn MeasureProvider,
    ) -> Result<Size> {
        let key = input.cache_key();
        let perform = input.perform_layout;

        if let Some(size) = self.node_mut(id)?.cache.lookup(&key, perform) {
            self.stats.hits += 1;
            trace!("Cache hit for {}: {}x{}", id, size.width, size.height);
            if perform {
                let node = self.node_mut(id)?;
                node.unrounded.width = size.width;
                node.unrounded.height = size.height;
                node.flags.remove(NodeFlags::DIRTY);
            }
            return Ok(size);
        }
        self.stats.misses += 1;

        let size = self.compute_node(id, input, measure)?;
        trace!(
            "Computed {} ({}): {}x{} for {:?}/{:?}",
            id,
            if perform { "layout" } else { "measure" },
            size.width,
            size.height,
            input.width_mode,
            input.height_mode
        );

        let debug = self.config.debug;
        let node = self.node_mut(id)?;
        node.cache.store(key, size, perform);
        if perform {
            node.unrounded.width = size.width;
            node.unrounded.height = size.height;
            node.flags.remove(NodeFlags::DIRTY);
            if debug {
                debug!("Node {} sized {:.2}x{:.2}", id, size.width, size.height);
            }
        }
        Ok(size)
    }

    fn compute_node(
        &mut self,
        id: NodeId,
        mut input: LayoutInput,
        measure: &mut dyn MeasureProvider,
    ) -> Result<Size> {
        let node = self.node(id)?;
        let style = node.style.clone();
        let is_measured = node.is_measured();
        let has_children = !node.children.is_empty();

        let direction = style.direction.resolve(input.parent_direction);
        let margin = resolve_edges(&style.margin, direction, input.owner_width);
        let (padding, border) = padding_and_border(&style, direction, input.owner_width);
        let pb = sum_edges(&padding, &border);

        let bounds = ConstraintBox::new(
            AxisBounds::new(
                style.min_width.resolve(input.owner_width),
                style.max_width.resolve(input.owner_width),
                horizontal(&pb),
            ),
            AxisBounds::new(
                style.min_height.resolve(input.owner_height),
                style.max_height.resolve(input.owner_height),
                vertical(&pb),
            ),
        );

        if let Some(ratio) = style.effective_aspect_ratio() {
            match (input.width_mode, input.height_mode, input.available_width, input.available_height) {
                (MeasureMode::Exactly, mode, Some(width), _) if mode != MeasureMode::Exactly => {
                    input.available_height = Some(width / ratio);
                    input.height_mode = MeasureMode::Exactly;
                }
                (mode, MeasureMode::Exactly, _, Some(height)) if mode != MeasureMode::Exactly => {
                    input.available_width = Some(height * ratio);
                    input.width_mode = MeasureMode::Exactly;
                }
                _ => {}
            }
        }

        if input.perform_layout {
            let node = self.node_mut(id)?;
            node.unrounded.direction = direction;
            node.unrounded.margin = margin;
            node.unrounded.padding = padding;
            node.unrounded.border = border;
            node.unrounded.had_overflow = false;
        }

        if is_measured {
            return self.measure_leaf(id, &input, &bounds, &pb, measure);
        }

        let exact = |size: Option<f32>, mode: MeasureMode| match (size, mode) {
            (Some(size), MeasureMode::Exactly) => Some(size),
            _ => None,
        };
        let exact_width = exact(input.available_width, input.width_mode);
        let exact_height = exact(input.available_height, input.height_mode);

        if !has_children {
            return Ok(Size::new(
                bounds.constrain_width(exact_width.unwrap_or(0.0)),
                bounds.constrain_height(exact_height.unwrap_or(0.0)),
            ));
        }

        if !input.perform_layout {
            if let (Some(width), Some(height)) = (exact_width, exact_height) {
                return Ok(Size::new(bounds.constrain_width(width), bounds.constrain_height(height)));
            }
        }

        self.layout_container(id, &style, direction, &input, &bounds, padding, border, measure)
    }

    fn measure_leaf(
        &mut self,
        id: NodeId,
        input: &LayoutInput,
        bounds: &ConstraintBox,
        pb: &[f32; 4],
        measure: &mut dyn MeasureProvider,
    ) -> Result<Size> {
        let pb_row = horizontal(pb);
        let pb_column = vertical(pb);

        if let ((Some(width), MeasureMode::Exactly), (Some(height), MeasureMode::Exactly)) =
            (input.axis(true), input.axis(false))
        {
            return Ok(Size::new(bounds.constrain_width(width), bounds.constrain_height(height)));
        }

        let request = MeasureInput::new(
            input.available_width.map(|width| (width - pb_row).max(0.0)),
            input.width_mode,
            input.available_height.map(|height| (height - pb_column).max(0.0)),
            input.height_mode,
        );
        self.stats.measure_calls += 1;
        let measured = measure
            .measure(id, request)
            .map_err(|source| LayoutError::Measure { node: id, source })?;
        trace!("Measured {}: {}x{} for {:?}", id, measured.width, measured.height, request);

        let content = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
        let width = match input.axis(true) {
            (Some(width), MeasureMode::Exactly) => width,
            _ => content(measured.width) + pb_row,
        };
        let height = match input.axis(false) {
            (Some(height), MeasureMode::Exactly) => height,
            _ => content(measured.height) + pb_column,
        };
        Ok(Size::new(bounds.constrain_width(width), bounds.constrain_height(height)))
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_container(
        &mut self,
        id: NodeId,
        style: &Style,
        direction: Direction,
        input: &LayoutInput,
        bounds: &ConstraintBox,
        padding: [f32; 4],
        border: [f32; 4],
        measure: &mut dyn MeasureProvider,
    ) -> Result<Size> {
        let axes = Axes::new(style, direction);
        let is_row = axes.is_row();
        let pb = sum_edges(&padding, &border);
        let pb_main = axes.main_sum(&pb);
        let pb_cross = axes.cross_sum(&pb);
        let main_bounds = *bounds.axis(is_row);
        let cross_bounds = *bounds.axis(!is_row);
        let (available_main, main_mode) = input.axis(is_row);
        let (available_cross, cross_mode) = input.axis(!is_row);
        let scroll = style.overflow == Overflow::Scroll;
        let wrap = style.flex_wrap != Wrap::NoWrap;

        let mut ctx = FlexContext {
            direction,
            axes,
            inner_width: inner_size(input.available_width, horizontal(&pb), &bounds.width),
            inner_height: inner_size(input.available_height, vertical(&pb), &bounds.height),
            width_mode: input.width_mode,
            height_mode: input.height_mode,
            overflow: style.overflow,
            single_line: true,
        };
        let inner_main = ctx.inner(is_row);

        // Flow children get a flex basis; hidden ones are zeroed and
        // absolute ones wait until the container has a size.
        let children = self.node(id)?.children.clone();
        let mut items = Vec::with_capacity(children.len());
        let mut absolute = Vec::new();
        for child in children {
            let child_style = self.node(child)?.style.clone();
            if child_style.is_hidden() {
                if input.perform_layout {
                    self.zero_out(child)?;
                }
                continue;
            }
            if child_style.is_absolute() {
                absolute.push(child);
                continue;
            }
            items.push(self.flex_item(child, child_style, style, &ctx, measure)?);
        }

        let mut lines = resolve::collect_lines(&items, &axes, wrap, inner_main);
        ctx.single_line = lines.len() == 1;
        let container_grow = style.resolved_flex_grow();
        let mut had_overflow = false;
        let mut max_extent: f32 = 0.0;

        for line in lines.iter_mut() {
            let available = if main_mode == MeasureMode::Exactly {
                inner_main.unwrap_or(line.consumed)
            } else {
                let min_inner = main_bounds.min - pb_main;
                let max_inner = main_bounds.max - pb_main;
                if min_inner > 0.0 && line.consumed < min_inner {
                    min_inner
                } else if max_inner.is_finite() && line.consumed > max_inner {
                    max_inner
                } else {
                    match inner_main {
                        Some(inner) if container_grow > 0.0 && line.grow > 0.0 => inner,
                        Some(inner) => line.consumed.min(inner),
                        None => line.consumed,
                    }
                }
            };

            let line_items = &mut items[line.start..line.end];
            let mut free = resolve::resolve_flexible_lengths(line_items, &axes, available);
            if free < 0.0 {
                had_overflow = true;
            }

            // Content of an at-most container does not spread past its
            // natural size unless a min size asks for it.
            if main_mode == MeasureMode::AtMost && free > 0.0 {
                let min_inner = main_bounds.min - pb_main;
                free = if min_inner > 0.0 {
                    (min_inner - (available - free)).max(0.0)
                } else {
                    0.0
                };
            }

            let auto_margins: usize = line_items.iter().map(|item| item.main_auto_margins(&axes)).sum();
            let (leading, between, auto_share) = if auto_margins > 0 {
                (0.0, 0.0, free.max(0.0) / auto_margins as f32)
            } else {
                let (leading, between) = resolve::justify_spacing(style.justify_content, free, line_items.len());
                (leading, between, 0.0)
            };

            let lead = axes.main_lead().index();
            let trail = axes.main_trail().index();
            let mut cursor = pb[lead] + leading;
            for (index, item) in line_items.iter_mut().enumerate() {
                if index > 0 {
                    cursor += between;
                }
                if item.auto_margin[lead] {
                    cursor += auto_share;
                }
                cursor += item.margin[lead];
                item.main_pos = cursor;
                cursor += item.target + item.margin[trail];
                if item.auto_margin[trail] {
                    cursor += auto_share;
                }
            }
            line.main_extent = cursor - pb[lead];
            max_extent = max_extent.max(line.main_extent);
        }

        let main_size = match (main_mode, available_main) {
            (MeasureMode::Exactly, Some(size)) => main_bounds.constrain(size),
            (MeasureMode::AtMost, Some(size)) if scroll => size
                .min(main_bounds.constrain_bounds(max_extent + pb_main))
                .max(pb_main),
            _ => main_bounds.constrain(max_extent + pb_main),
        };

        // Cross sizes only matter when the container's own cross size
        // depends on them or children are about to be placed.
        if input.perform_layout || cross_mode != MeasureMode::Exactly {
            for item in items.iter_mut() {
                item.cross = self.item_cross_size(item, &ctx, measure)?;
            }
        }

        for line in lines.iter_mut() {
            line.cross = items[line.start..line.end]
                .iter()
                .map(|item| item.outer_cross(&axes))
                .fold(0.0, f32::max);
        }
        if !wrap && cross_mode == MeasureMode::Exactly {
            if let Some(inner_cross) = ctx.inner(!is_row) {
                lines[0].cross = inner_cross;
            }
        }
        let total_cross: f32 = lines.iter().map(|line| line.cross).sum();

        let cross_size = match (cross_mode, available_cross) {
            (MeasureMode::Exactly, Some(size)) => cross_bounds.constrain(size),
            (MeasureMode::AtMost, Some(size)) if scroll => size
                .min(cross_bounds.constrain_bounds(total_cross + pb_cross))
                .max(pb_cross),
            _ => cross_bounds.constrain(total_cross + pb_cross),
        };

        let size = Size::from_axes(is_row, main_size, cross_size);
        if !input.perform_layout {
            return Ok(size);
        }

        // Lines along the cross axis.
        let inner_cross = (cross_size - pb_cross).max(0.0);
        if wrap {
            let free = inner_cross - total_cross;
            let (leading, between, extra) =
                resolve::align_content_spacing(style.align_content, free, lines.len());
            let mut cursor = pb[axes.cross_lead.index()] + leading;
            for line in lines.iter_mut() {
                line.cross += extra;
                line.cross_start = cursor;
                cursor += line.cross + between;
            }
        } else {
            lines[0].cross = inner_cross;
            lines[0].cross_start = pb[axes.cross_lead.index()];
        }

        // Items within their line.
        let cross_lead = axes.cross_lead.index();
        let cross_trail = axes.cross_trail.index();
        for line in &lines {
            for item in items[line.start..line.end].iter_mut() {
                let margin_cross = item.margin_cross(&axes);
                let auto_lead = item.auto_margin[cross_lead];
                let auto_trail = item.auto_margin[cross_trail];
                let definite_cross = item.style.dimension(!is_row).resolve(ctx.inner(!is_row)).is_some();

                if item.align == Align::Stretch
                    && !definite_cross
                    && !auto_lead
                    && !auto_trail
                    && item.style.effective_aspect_ratio().is_none()
                {
                    item.cross = item.cross_bounds.constrain(line.cross - margin_cross);
                }

                let free = line.cross - item.cross - margin_cross;
                let offset = match (auto_lead, auto_trail) {
                    (true, true) => free.max(0.0) / 2.0,
                    (true, false) => free.max(0.0),
                    (false, true) => 0.0,
                    (false, false) => match item.align {
                        Align::FlexEnd => free,
                        Align::Center => free / 2.0,
                        _ => 0.0,
                    },
                };
                item.cross_pos = line.cross_start + item.margin[cross_lead] + offset;
            }
        }

        for item in &items {
            let item_size = Size::from_axes(is_row, item.target, item.cross);
            self.layout_node(
                item.id,
                LayoutInput::new(
                    (Some(item_size.width), MeasureMode::Exactly),
                    (Some(item_size.height), MeasureMode::Exactly),
                    ctx.owner(),
                    direction,
                    true,
                ),
                measure,
            )?;

            let main = physical_offset(axes.main_lead(), item.main_pos, item.target, main_size);
            let cross = physical_offset(axes.cross_lead, item.cross_pos, item.cross, cross_size);
            let (left, top) = if is_row { (main, cross) } else { (cross, main) };
            let (dx, dy) = relative_offset(&item.style, item.direction, ctx.inner_width, ctx.inner_height);

            let node = self.node_mut(item.id)?;
            node.unrounded.left = left + dx;
            node.unrounded.top = top + dy;
        }

        let container = AbsoluteContainer {
            style,
            direction,
            axes,
            size,
            padding,
            border,
        };
        for child in absolute {
            self.layout_absolute_child(child, &container, measure)?;
        }

        self.node_mut(id)?.unrounded.had_overflow = had_overflow;
        Ok(size)
    }

    fn flex_item(
        &mut self,
        id: NodeId,
        style: Style,
        container: &Style,
        ctx: &FlexContext,
        measure: &mut dyn MeasureProvider,
    ) -> Result<FlexItem> {
        let is_row = ctx.axes.is_row();
        let direction = style.direction.resolve(ctx.direction);
        let margin = resolve_edges(&style.margin, direction, ctx.inner_width);
        let auto_margin = Edge::PHYSICAL.map(|edge| style.margin.resolve(edge, direction).is_auto());
        let (padding, border) = padding_and_border(&style, direction, ctx.inner_width);
        let pb = sum_edges(&padding, &border);

        let width_bounds = AxisBounds::new(
            style.min_width.resolve(ctx.inner_width),
            style.max_width.resolve(ctx.inner_width),
            horizontal(&pb),
        );
        let height_bounds = AxisBounds::new(
            style.min_height.resolve(ctx.inner_height),
            style.max_height.resolve(ctx.inner_height),
            vertical(&pb),
        );
        let (main_bounds, cross_bounds) = if is_row {
            (width_bounds, height_bounds)
        } else {
            (height_bounds, width_bounds)
        };

        // Baseline alignment has no text metrics to work with here.
        let align = match style.resolved_align_self(container) {
            Align::Baseline | Align::Auto => Align::FlexStart,
            align => align,
        };

        let mut item = FlexItem {
            id,
            grow: style.resolved_flex_grow(),
            shrink: style.resolved_flex_shrink(),
            style,
            direction,
            margin,
            auto_margin,
            align,
            basis: 0.0,
            hypothetical: 0.0,
            target: 0.0,
            cross: 0.0,
            main_bounds,
            cross_bounds,
            frozen: false,
            violation: 0.0,
            main_pos: 0.0,
            cross_pos: 0.0,
        };
        item.basis = self.flex_basis(&item, ctx, measure)?;
        item.hypothetical = item.main_bounds.constrain(item.basis);
        item.target = item.hypothetical;
        Ok(item)
    }

    /// Explicit flex-basis, then a definite main size, then the size of the
    /// content measured under the container's constraints.
    fn flex_basis(&mut self, item: &FlexItem, ctx: &FlexContext, measure: &mut dyn MeasureProvider) -> Result<f32> {
        let is_row = ctx.axes.is_row();
        let main_reference = ctx.inner(is_row);
        let floor = item.main_bounds.floor;

        if let Some(basis) = item.style.resolved_flex_basis().resolve(main_reference) {
            return Ok(basis.max(floor));
        }
        if let Some(size) = item.style.dimension(is_row).resolve(main_reference) {
            return Ok(size.max(floor));
        }

        let margin_row = horizontal(&item.margin);
        let margin_column = vertical(&item.margin);
        let exact = |size: Option<f32>| size.map(|size| (Some(size), MeasureMode::Exactly));
        let mut width = exact(item.style.width.resolve(ctx.inner_width));
        let mut height = exact(item.style.height.resolve(ctx.inner_height));

        // A scroll container leaves its main axis open.
        let scroll = ctx.overflow == Overflow::Scroll;
        if width.is_none() && (!scroll || !is_row) {
            width = ctx.inner_width.map(|w| (Some((w - margin_row).max(0.0)), MeasureMode::AtMost));
        }
        if height.is_none() && (!scroll || is_row) {
            height = ctx.inner_height.map(|h| (Some((h - margin_column).max(0.0)), MeasureMode::AtMost));
        }

        if ctx.stretches(item) {
            if !is_row && item.style.width.resolve(ctx.inner_width).is_none() && ctx.width_mode == MeasureMode::Exactly {
                width = ctx.inner_width.map(|w| (Some((w - margin_row).max(0.0)), MeasureMode::Exactly));
            }
            if is_row && item.style.height.resolve(ctx.inner_height).is_none() && ctx.height_mode == MeasureMode::Exactly {
                height = ctx.inner_height.map(|h| (Some((h - margin_column).max(0.0)), MeasureMode::Exactly));
            }
        }

        if let Some(ratio) = item.style.effective_aspect_ratio() {
            match (is_row, width, height) {
                (false, Some((Some(w), MeasureMode::Exactly)), _) => {
                    height = Some((Some(w / ratio), MeasureMode::Exactly));
                }
                (true, _, Some((Some(h), MeasureMode::Exactly))) => {
                    width = Some((Some(h * ratio), MeasureMode::Exactly));
                }
                _ => {}
            }
        }

        let (width, width_mode) = width.unwrap_or((None, MeasureMode::Undefined));
        let (height, height_mode) = height.unwrap_or((None, MeasureMode::Undefined));
        let (main_available, main_mode) = if is_row { (width, width_mode) } else { (height, height_mode) };
        let (cross_available, cross_mode) = if is_row { (height, height_mode) } else { (width, width_mode) };
        let main_axis = item.main_bounds.constrain_available(main_available, main_mode);
        let cross_axis = item.cross_bounds.constrain_available(cross_available, cross_mode);
        let (width, height) = if is_row { (main_axis, cross_axis) } else { (cross_axis, main_axis) };

        let size = self.layout_node(
            item.id,
            LayoutInput::new(width, height, ctx.owner(), ctx.direction, false),
            measure,
        )?;
        Ok(size.along(is_row).max(floor))
    }

    /// Border-box cross size of an item once its main size is resolved.
    fn item_cross_size(&mut self, item: &FlexItem, ctx: &FlexContext, measure: &mut dyn MeasureProvider) -> Result<f32> {
        let is_row = ctx.axes.is_row();
        let cross_reference = ctx.inner(!is_row);
        let margin_cross = item.margin_cross(&ctx.axes);

        let (cross, cross_mode) = if let Some(size) = item.style.dimension(!is_row).resolve(cross_reference) {
            (Some(size), MeasureMode::Exactly)
        } else if let Some(ratio) = item.style.effective_aspect_ratio() {
            let size = if is_row { item.target / ratio } else { item.target * ratio };
            (Some(size), MeasureMode::Exactly)
        } else if ctx.stretches(item) && ctx.single_line && ctx.mode(!is_row) == MeasureMode::Exactly {
            (cross_reference.map(|size| (size - margin_cross).max(0.0)), MeasureMode::Exactly)
        } else {
            (cross_reference.map(|size| (size - margin_cross).max(0.0)), MeasureMode::AtMost)
        };
        let cross_axis = item.cross_bounds.constrain_available(cross, cross_mode);
        let main_axis = (Some(item.target), MeasureMode::Exactly);
        let (width, height) = if is_row { (main_axis, cross_axis) } else { (cross_axis, main_axis) };

        let size = self.layout_node(
            item.id,
            LayoutInput::new(width, height, ctx.owner(), ctx.direction, false),
            measure,
        )?;
        Ok(size.along(!is_row))
    }

    /// Display-none subtrees occupy no space and count as laid out.
    fn zero_out(&mut self, id: NodeId) -> Result<()> {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = self.node_mut(current)?;
            node.unrounded = LayoutResult::default();
            // Cached sizes no longer match the zeroed results.
            node.cache.clear();
            node.flags.remove(NodeFlags::DIRTY);
            pending.extend(node.children.iter().copied());
        }
        Ok(())
    }

    /// Drops every result and cached entry under `root` after a failed pass
    /// and leaves the subtree and its ancestors dirty.
    fn reset_subtree(&mut self, root: NodeId) {
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if let Ok(node) = self.node_mut(current) {
                node.layout = LayoutResult::default();
                node.unrounded = LayoutResult::default();
                node.cache.clear();
                node.flags.insert(NodeFlags::DIRTY);
                pending.extend(node.children.iter().copied());
            }
        }

        let mut current = self.node(root).ok().and_then(|node| node.parent);
        while let Some(ancestor) = current {
            match self.node_mut(ancestor) {
                Ok(node) => {
                    node.flags.insert(NodeFlags::DIRTY);
                    node.cache.clear();
                    current = node.parent;
                }
                Err(_) => break,
            }
        }
    }
}
