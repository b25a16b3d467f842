//! LLM Prompt 模板
//!
//! 文件文档生成使用的系统指令和用户 Prompt

/// 系统指令
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates obsidian markdown documentation. Documentation should assume the reader knows nothing about the area they are about to read.";

/// 文件文档 Prompt
pub const FILE_DOC_PROMPT: &str = r#"
Analyze the following file and generate Obsidian Markdown documentation for it. The output of your response will be written into a file directly, so do not assume back ticks or additional comments will be needed for viewing.

For code files include the following:

*   **Summary:** A brief description of the class's purpose.
*   **Properties:** List the properties with their types.
*   **Methods:**  List the methods with their return types and parameters (if any).
*   **References:**  Identify any classes or types this class interacts with, and format them as Obsidian internal links [[ ]] where appropriate (assume standard library types don't need links).

Do not include doc comments in the output. format everything as an obsidian markdown file.

For all other files include the following:
*   **Summary:** A brief description of the class's purpose.
*   **Tags:**  Create a list of tags that describe the content of the file, and format them as Obsidian internal links [[ ]] where appropriate.


<ExampleOutput>
## MoveModeDefault

**Summary:** Defines the default movement mode for a player, handling ground movement, velocity adjustments, and step handling.

**Properties:**
*   `Player` -> `PlayerPawn`- The player pawn associated with this move mode.
*   `Priority` -> `int` - Determines the priority of this move mode when multiple move modes are available.
*   `GroundAngle` -> `float` - The maximum angle (in degrees) between the surface normal and the up vector for a surface to be considered ground.
*   `StepUpHeight` -> `float` - The maximum height a player can step up onto.
*   `StepDownHeight` -> `float` - The maximum height a player can step down from.

**Methods:**
*   `Score(PlayerController controller)` -> `int` - Returns the score of this move mode, which is its priority. Takes a PlayerController as a parameter.
*   `AddVelocity()` -> `void` - Adds velocity to the player based on their wish velocity, ground friction, and whether they are on the ground.
*   `PrePhysicsStep()` -> `void` - Called before the physics simulation step.  Handles stepping up.
*   `PostPhysicsStep()` -> `void` - Called after the physics simulation step. Handles sticking to the ground/stepping down.
*   `IsStandableSurface(in SceneTraceResult result)` -> `bool` - Determines if a surface is standable based on its normal angle relative to the up vector. Takes a SceneTraceResult as a parameter.
*   `UpdateMove(Rotation eyes, Vector3 input)` -> `Vector3` - Updates the move vector based on the player's input and eye rotation. Takes a Rotation and a Vector3 as parameters.

**References:**
*   [[MoveMode]]
*   [[PlayerPawn]]
*   [[PlayerController]]
</ExampleOutput>

```
{file_content}
```
"#;

/// 格式化文件文档 Prompt
pub fn format_file_doc_prompt(file_content: &str) -> String {
    FILE_DOC_PROMPT.replace("{file_content}", file_content)
}
