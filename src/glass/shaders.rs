//! WGSL sources for the GPU glass backend.
//!
//! Every texture is `Rgba8UnormSrgb` holding straight alpha, so samples
//! arrive in linear light and writes are re-encoded on store.

/// Fullscreen triangle shared by every pass. `uv` is y-down like the frame.
const FULLSCREEN_VS: &str = r#"
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VsOut {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: VsOut;
    out.position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}
"#;

/// One direction of a separable Gaussian blur, weighted in premultiplied space.
const BLUR_FS: &str = r#"
struct BlurUniforms {
    texel: vec2<f32>,
    direction: vec2<f32>,
    radius: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var src_tex: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;
@group(0) @binding(2) var<uniform> blur: BlurUniforms;

fn gaussian_weight(x: f32, sigma: f32) -> f32 {
    return exp(-(x * x) / (2.0 * sigma * sigma));
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let taps = i32(ceil(blur.radius));
    if taps <= 0 {
        return textureSampleLevel(src_tex, src_sampler, in.uv, 0.0);
    }
    let sigma = max(blur.radius * 0.5, 0.5);
    var acc = vec4<f32>(0.0);
    var total = 0.0;
    for (var k = -taps; k <= taps; k = k + 1) {
        let w = gaussian_weight(f32(k), sigma);
        let offset = blur.direction * blur.texel * f32(k);
        let c = textureSampleLevel(src_tex, src_sampler, in.uv + offset, 0.0);
        acc += vec4<f32>(c.rgb * c.a, c.a) * w;
        total += w;
    }
    acc = acc / total;
    if acc.a <= 0.0001 {
        return vec4<f32>(0.0);
    }
    return vec4<f32>(acc.rgb / acc.a, acc.a);
}
"#;

/// The glass layer itself. `frame.y` selects the drop shadow (0) or body (1).
const GLASS_FS: &str = r#"
struct GlassUniforms {
    // size, pass kind, translucency, content alpha
    frame: vec4<f32>,
    // light x, light y, aberration px, border px
    light: vec4<f32>,
    // tint rgb (sRGB), saturation boost
    tint: vec4<f32>,
    // kind (0 off, 1 neutral, 2 chromatic), amount, offset px, specular on
    shadow: vec4<f32>,
    // content bounds x0, y0, x1, y1 in px
    bounds: vec4<f32>,
    // inner shadow, dark adjust, mono adjust, unused
    adjust: vec4<f32>,
};

@group(0) @binding(0) var content_tex: texture_2d<f32>;
@group(0) @binding(1) var backdrop_tex: texture_2d<f32>;
@group(0) @binding(2) var soft_tex: texture_2d<f32>;
@group(0) @binding(3) var tex_sampler: sampler;
@group(0) @binding(4) var<uniform> u: GlassUniforms;

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    return pow(c, vec3<f32>(2.2));
}

fn screen(base: vec3<f32>, amount: f32) -> vec3<f32> {
    return vec3<f32>(1.0) - (vec3<f32>(1.0) - base) * (1.0 - clamp(amount, 0.0, 1.0));
}

fn adjust_saturation(c: vec3<f32>, s: f32) -> vec3<f32> {
    let l = dot(c, vec3<f32>(0.2126, 0.7152, 0.0722));
    return clamp(mix(vec3<f32>(l), c, s), vec3<f32>(0.0), vec3<f32>(1.0));
}

// 0 on the lit edge of the frame, 1 on the opposite edge.
fn axis_param(p: vec2<f32>) -> f32 {
    let size = u.frame.x;
    return clamp(0.5 - dot(p - vec2<f32>(size * 0.5), u.light.xy) / size, 0.0, 1.0);
}

fn fresnel(s: f32) -> f32 {
    if s < 0.35 {
        return mix(0.42, 0.06, s / 0.35);
    }
    return mix(0.06, 0.0, (s - 0.35) / 0.65);
}

fn soft_alpha(uv: vec2<f32>) -> f32 {
    return textureSampleLevel(soft_tex, tex_sampler, uv, 0.0).a;
}

fn shadow_pass(uv: vec2<f32>) -> vec4<f32> {
    let d = u.shadow.z / u.frame.x;
    let amount = u.shadow.y;
    if u.shadow.x < 1.5 {
        return vec4<f32>(0.0, 0.0, 0.0, soft_alpha(uv - vec2<f32>(0.0, d)) * 0.5 * amount);
    }
    let a1 = soft_alpha(uv - vec2<f32>(-d, d)) * 0.45 * amount;
    let a2 = soft_alpha(uv - vec2<f32>(d, d)) * 0.45 * amount;
    let p1 = srgb_to_linear(vec3<f32>(90.0, 70.0, 255.0) / 255.0) * a1;
    let p2 = srgb_to_linear(vec3<f32>(255.0, 60.0, 170.0) / 255.0) * a2;
    let rgb = p1 + p2 - p1 * p2;
    let a = a1 + a2 - a1 * a2;
    if a <= 0.0001 {
        return vec4<f32>(0.0);
    }
    return vec4<f32>(rgb / a, a);
}

fn body_pass(uv: vec2<f32>, p: vec2<f32>) -> vec4<f32> {
    let content = textureSampleLevel(content_tex, tex_sampler, uv, 0.0);
    if content.a <= 0.0 {
        return vec4<f32>(0.0);
    }
    let size = u.frame.x;
    let texel = 1.0 / size;

    // Chromatic aberration along the outward edge normal.
    let gx = soft_alpha(uv + vec2<f32>(texel, 0.0)) - soft_alpha(uv - vec2<f32>(texel, 0.0));
    let gy = soft_alpha(uv + vec2<f32>(0.0, texel)) - soft_alpha(uv - vec2<f32>(0.0, texel));
    var n = vec2<f32>(0.0);
    let len = length(vec2<f32>(gx, gy));
    if len > 0.0001 {
        n = -vec2<f32>(gx, gy) / len;
    }
    let shift = n * u.light.z * (1.0 - soft_alpha(uv)) * texel;
    let r = textureSampleLevel(backdrop_tex, tex_sampler, uv + shift, 0.0).r;
    let g = textureSampleLevel(backdrop_tex, tex_sampler, uv, 0.0).g;
    let b = textureSampleLevel(backdrop_tex, tex_sampler, uv - shift, 0.0).b;
    let sampled = adjust_saturation(vec3<f32>(r, g, b), u.tint.w);

    // Tint, translucency, and content.
    let t = u.frame.z;
    let glass_base = mix(srgb_to_linear(u.tint.rgb), sampled, t);
    var rgb = mix(content.rgb, glass_base, t);
    rgb = mix(rgb, content.rgb, u.frame.w);

    let bounds = u.bounds;
    if u.shadow.w > 0.5 {
        let half_size = size * 0.5;
        let center = vec2<f32>(half_size) + u.light.xy * 0.3 * half_size;
        let dist = clamp(distance(p, center) / (0.75 * size), 0.0, 1.0);
        rgb = screen(rgb, 0.6 * pow(1.0 - dist, 5.0));

        let strip = (bounds.w - bounds.y) * 0.22;
        if strip > 0.0 && p.x >= bounds.x && p.x <= bounds.z && p.y >= bounds.y && p.y <= bounds.y + strip {
            rgb = screen(rgb, 0.35 * (1.0 - (p.y - bounds.y) / strip));
        }
    }

    let s = axis_param(p);
    rgb = screen(rgb, fresnel(s));

    // Border ring: coverage minus an eight-tap erosion.
    var dirs = array<vec2<f32>, 8>(
        vec2<f32>(1.0, 0.0), vec2<f32>(-1.0, 0.0), vec2<f32>(0.0, 1.0), vec2<f32>(0.0, -1.0),
        vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0), vec2<f32>(1.0, -1.0), vec2<f32>(-1.0, -1.0),
    );
    var eroded = content.a;
    for (var i = 0; i < 8; i = i + 1) {
        let tap = textureSampleLevel(content_tex, tex_sampler, uv + dirs[i] * u.light.w * texel, 0.0).a;
        eroded = min(eroded, tap);
    }
    let ring = clamp(content.a - eroded, 0.0, 1.0);
    rgb = screen(rgb, ring * mix(0.85, 0.2, s));

    let center = (bounds.xy + bounds.zw) * 0.5;
    let half_diagonal = max(length(bounds.zw - bounds.xy) * 0.5, 1.0);
    let falloff = clamp((distance(p, center) / half_diagonal - 0.42) / 0.58, 0.0, 1.0);
    rgb = rgb * (1.0 - u.adjust.x * falloff);

    rgb = mix(rgb, srgb_to_linear(vec3<f32>(5.0, 10.0, 30.0) / 255.0), u.adjust.y * 0.6);
    rgb = mix(rgb, srgb_to_linear(vec3<f32>(235.0, 238.0, 242.0) / 255.0), u.adjust.z * 0.7);

    return vec4<f32>(clamp(rgb, vec3<f32>(0.0), vec3<f32>(1.0)), content.a);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    if u.frame.y < 0.5 {
        return shadow_pass(in.uv);
    }
    return body_pass(in.uv, in.position.xy);
}
"#;

pub fn blur_shader() -> String {
    format!("{FULLSCREEN_VS}{BLUR_FS}")
}

pub fn glass_shader() -> String {
    format!("{FULLSCREEN_VS}{GLASS_FS}")
}
