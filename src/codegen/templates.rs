//! Fixed program text. The emitted program runs against the template
//! project's `gui.js`, `animator.js` and `camera.js`.

pub const IMPORTS: &str = "\
import * as THREE from \"three\";
import { OrbitControls } from \"three/examples/jsm/controls/OrbitControls\";
import { MyGui } from \"./gui\";
import { MyMixer } from \"./animator\";
import { MyCamera } from \"./camera\";
";

pub const BEGINNING_BOILERPLATE: &str = "
// Create renderer
var renderer = new THREE.WebGLRenderer({ antialias: true });
renderer.setSize(window.innerWidth, window.innerHeight);
document.body.appendChild(renderer.domElement);

// Create scene
const scene = new THREE.Scene();

// Create camera
var camera_per = new THREE.PerspectiveCamera(
    75,
    window.innerWidth / window.innerHeight,
    0.1,
    1000,
);
camera_per.position.z = 25;

// Create controls
const controls = new OrbitControls(camera_per, renderer.domElement);

// Create instance of mixer
const mixer = new MyMixer(scene);

// Add camera
const camera = new MyCamera(scene, camera_per);

// Followable objects
var followable_objects = [];

";

pub const OBJ_LOADER_IMPORT: &str =
    "import { OBJLoader } from \"three/examples/jsm/loaders/OBJLoader\";\n";
pub const OBJ_LOADER_BOILERPLATE: &str = "const OBJ_LOADER = new OBJLoader();\n";

pub const MTL_LOADER_IMPORT: &str =
    "import { MTLLoader } from \"three/examples/jsm/loaders/MTLLoader\";\n";
pub const MTL_LOADER_BOILERPLATE: &str = "const MTL_LOADER = new MTLLoader();\n";

pub const STATS_IMPORT: &str = "import Stats from \"three/examples/jsm/libs/stats.module\";\n";
pub const STATS_BOILERPLATE: &str = "const stats = Stats();\ndocument.body.appendChild(stats.dom);\n";

/// Per-frame statement that drives a shader material's `time` uniform from
/// the animation's playback time.
pub fn time_uniform_update(material_var: &str) -> String {
    format!("{material_var}.uniforms.time.value = mixer.clip_action.time;")
}

/// Closing part of the program: GUI, clock, render loop and `animate()`.
/// `frame_updates` are spliced into `animate()` between the GUI time update
/// and the camera update.
pub fn ending_boilerplate(show_stats: bool, frame_updates: &[&str]) -> String {
    let (stats_begin, stats_end) = if show_stats {
        ("    stats.begin();\n", "    stats.end();\n")
    } else {
        ("", "")
    };
    let updates: String = frame_updates
        .iter()
        .map(|stmt| format!("        {stmt}\n"))
        .collect();

    format!(
        "
// Add geometry to camera
camera.addFollowableObjects(followable_objects);

// Lock the mixer (this generates the clip and clip action)
mixer.lock();

// Create basic video functions and variables
var paused = false;
function pause_play() {{
    if (paused) {{
        paused = false;
        clock.start();
        gui.play();
    }} else {{
        paused = true;
        clock.stop();
        gui.pause();
    }}
}}

// Create GUI
const gui = new MyGui();
gui.addVideoControls(pause_play, mixer);
gui.addCameraControls(camera);

const clock = new THREE.Clock();

// Render Loop
var render = function () {{
    // Render scene
    requestAnimationFrame(render);
{stats_begin}    animate();
    renderer.render(scene, camera_per);
{stats_end}}};

// Animation
function animate() {{
    if (!paused) {{
        // Update animation
        var delta = clock.getDelta();
        mixer.update(delta);
        gui.updateTime();
{updates}        camera.update();
    }}
}}

controls.update();
render();
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ending_has_no_stats_calls() {
        let text = ending_boilerplate(false, &[]);
        assert!(!text.contains("stats"));
        assert!(text.contains("        gui.updateTime();\n        camera.update();"));
        assert!(text.ends_with("controls.update();\nrender();\n"));
    }

    #[test]
    fn stats_wrap_the_render_loop() {
        let text = ending_boilerplate(true, &[]);
        let begin = text.find("stats.begin();").unwrap();
        let animate = text.find("    animate();").unwrap();
        let end = text.find("stats.end();").unwrap();
        assert!(begin < animate && animate < end);
    }

    #[test]
    fn frame_updates_sit_between_gui_and_camera() {
        let stmt = time_uniform_update("water_material");
        let text = ending_boilerplate(false, &[stmt.as_str()]);
        assert!(text.contains(
            "gui.updateTime();\n        water_material.uniforms.time.value = mixer.clip_action.time;\n        camera.update();"
        ));
    }
}
